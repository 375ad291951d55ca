use std::sync::Arc;

use crate::features::drawing::{DigitPicker, DrawingStore};
use crate::features::home::PageRenderer;

/// 聚合的应用共享状态
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<DrawingStore>,
    /// 下一轮提示数字的随机来源
    pub picker: Arc<DigitPicker>,
    pub pages: Arc<PageRenderer>,
    /// 排行榜条数（已按配置钳制到 1..=100）
    pub leaderboard_limit: i64,
}

impl AppState {
    pub fn new(store: DrawingStore, picker: DigitPicker, pages: PageRenderer, leaderboard_limit: i64) -> Self {
        Self {
            store: Arc::new(store),
            picker: Arc::new(picker),
            pages: Arc::new(pages),
            leaderboard_limit,
        }
    }
}
