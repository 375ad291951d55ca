pub mod handler;
pub mod models;

pub use handler::create_leaderboard_router;
pub use models::{LeaderboardEntry, LeaderboardResponse};
