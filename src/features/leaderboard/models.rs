use serde::{Deserialize, Serialize};

/// 单个提交者的累计条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[schema(example = json!({"username": "ann", "count": 42}))]
pub struct LeaderboardEntry {
    /// 提交者名称（未署名为 Anonymous）
    pub username: String,
    /// 累计提交数量
    pub count: i64,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[schema(example = json!({
  "leaderboard": [
    {"username": "ann", "count": 42},
    {"username": "Anonymous", "count": 17}
  ]
}))]
pub struct LeaderboardResponse {
    /// 按数量降序（同数量按名称升序）
    pub leaderboard: Vec<LeaderboardEntry>,
}
