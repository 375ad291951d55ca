use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::features::health::handler::health_check,
        crate::features::home::handler::index,
        crate::features::drawing::handler::save_drawing,
        crate::features::leaderboard::handler::get_leaderboard,
    ),
    components(
        schemas(
            crate::error::AppError,
            crate::error::ProblemDetails,
            crate::features::health::handler::HealthResponse,
            crate::features::drawing::models::SaveDrawingRequest,
            crate::features::drawing::models::SaveDrawingResponse,
            crate::features::drawing::models::SaveStatus,
            crate::features::leaderboard::models::LeaderboardEntry,
            crate::features::leaderboard::models::LeaderboardResponse,
        )
    ),
    tags(
        (
            name = "Drawing",
            description = "手写数字采集：绘制页面与提交接口。"
        ),
        (name = "Leaderboard", description = "排行榜：按提交数量统计的贡献者排名。"),
        (name = "Health", description = "健康检查：服务探活。"),
    ),
    info(
        title = "Digit Collector API",
        version = env!("CARGO_PKG_VERSION"),
        description = "手写数字采集服务 API（Axum + utoipa）。"
    )
)]
pub struct ApiDoc;
