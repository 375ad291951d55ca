use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 未填写或仅含空白的提交者名称统一记为该值
pub const ANONYMOUS_USERNAME: &str = "Anonymous";

/// 归一化提交者名称：去除首尾空白，空串回落为 `Anonymous`
pub fn normalize_username(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => ANONYMOUS_USERNAME.to_string(),
    }
}

/// 一条已入库的手写数字记录（创建后不可变）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawingRecord {
    pub id: i64,
    pub username: String,
    pub digit_label: i64,
    /// 28×28 灰度 PNG 的 data URI
    pub image_data: String,
    pub created_at: DateTime<Utc>,
}

impl std::fmt::Display for DrawingRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} - Digit {} - {}",
            self.username,
            self.digit_label,
            self.created_at.format("%Y-%m-%d %H:%M")
        )
    }
}

/// 提交请求体。字段保持宽松类型，缺失/类型错误由处理器统一转换为错误信封。
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[schema(example = json!({
  "digit": 3,
  "image": "data:image/png;base64,iVBORw0KGgo...",
  "username": "ann"
}))]
pub struct SaveDrawingRequest {
    /// 绘制的数字标签（整数，约定 0-9；也接受可解析为整数的字符串）
    #[schema(value_type = Option<i64>)]
    pub digit: Option<serde_json::Value>,
    /// 画布导出的图片 data URI
    pub image: Option<String>,
    /// 提交者名称（可选，空白记为 Anonymous）
    pub username: Option<String>,
}

/// 提交结果状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SaveStatus {
    Success,
    Error,
}

/// `/save-drawing/` 的统一响应信封（成功与失败共用）
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[schema(example = json!({
  "status": "success",
  "message": "Drawing saved successfully!",
  "id": 42,
  "user_count": 7,
  "total_count": 1024,
  "new_digit": 5
}))]
pub struct SaveDrawingResponse {
    pub status: SaveStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_digit: Option<u8>,
}

impl SaveDrawingResponse {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: SaveStatus::Error,
            message: message.into(),
            id: None,
            user_count: None,
            total_count: None,
            new_digit: None,
        }
    }
}
