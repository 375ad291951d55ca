pub mod drawing;
pub mod export;
pub mod health;
pub mod home;
pub mod image;
pub mod leaderboard;

use axum::Router;

use crate::state::AppState;

/// 组合全部业务路由（不含中间件与文档路由）
pub fn create_app_router(state: AppState, max_payload_bytes: usize) -> Router {
    Router::<AppState>::new()
        .merge(home::create_home_router())
        .merge(drawing::create_drawing_router(max_payload_bytes))
        .merge(leaderboard::create_leaderboard_router())
        .merge(health::create_health_router())
        .with_state(state)
}
