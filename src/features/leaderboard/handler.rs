use axum::{Router, extract::State, response::Json, routing::get};

use crate::{error::AppError, state::AppState};

use super::models::LeaderboardResponse;

#[utoipa::path(
    get,
    path = "/leaderboard/",
    summary = "提交者排行榜",
    description = "按提交数量降序返回前 N 名提交者（N 由 drawing.leaderboard_limit 配置，默认 10）；数量相同按名称升序。",
    responses(
        (status = 200, description = "排行榜", body = LeaderboardResponse),
        (
            status = 503,
            description = "存储不可用",
            body = crate::error::ProblemDetails,
            content_type = "application/problem+json"
        )
    ),
    tag = "Leaderboard"
)]
pub async fn get_leaderboard(
    State(state): State<AppState>,
) -> Result<Json<LeaderboardResponse>, AppError> {
    let leaderboard = state.store.leaderboard(state.leaderboard_limit).await?;
    Ok(Json(LeaderboardResponse { leaderboard }))
}

pub fn create_leaderboard_router() -> Router<AppState> {
    Router::<AppState>::new().route("/leaderboard/", get(get_leaderboard))
}
