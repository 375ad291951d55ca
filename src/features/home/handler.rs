use axum::{Router, extract::State, response::Html, routing::get};

use crate::{error::AppError, state::AppState};

use super::renderer::IndexContext;

#[utoipa::path(
    get,
    path = "/",
    summary = "绘制页面",
    description = "返回包含画布、待画数字、全站累计数量与排行榜的 HTML 页面。",
    responses(
        (status = 200, description = "HTML 页面", body = String, content_type = "text/html"),
        (
            status = 503,
            description = "存储不可用",
            body = crate::error::ProblemDetails,
            content_type = "application/problem+json"
        )
    ),
    tag = "Drawing"
)]
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let total_drawings = state.store.count_all().await?;
    let leaderboard = state.store.leaderboard(state.leaderboard_limit).await?;
    let ctx = IndexContext {
        digit_to_draw: state.picker.next_digit(),
        total_drawings,
        leaderboard,
    };
    Ok(Html(state.pages.render_index(&ctx)?))
}

pub fn create_home_router() -> Router<AppState> {
    Router::<AppState>::new().route("/", get(index))
}
