use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// 应用统一错误类型
#[derive(Error, Debug, utoipa::ToSchema)]
pub enum AppError {
    /// 图片载荷无法解码（base64 非法 / 栅格数据损坏）
    #[error("图片解码失败: {0}")]
    ImageDecode(String),

    /// 存储层不可用或执行失败
    #[error("存储错误: {0}")]
    Storage(String),

    /// 缺少所需能力（如编译时未启用 npz 导出）
    #[error("缺少能力: {0}")]
    MissingCapability(String),

    /// 请求体不是合法 JSON
    #[error("JSON 解析错误: {0}")]
    Json(String),

    /// 参数校验错误
    #[error("参数校验错误: {0}")]
    Validation(String),

    /// 文件读写错误
    #[error("I/O 错误: {0}")]
    Io(String),

    /// 内部服务器错误
    #[error("内部错误: {0}")]
    Internal(String),
}

/// RFC7807 风格的错误响应（Problem Details）。
///
/// 除 `/save-drawing/` 使用自身的 `{status, message}` 信封外，其余接口的错误均以此结构返回。
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProblemDetails {
    /// 问题类型（URI）。若无更细分的类型，可使用 about:blank。
    #[serde(rename = "type")]
    #[schema(example = "about:blank")]
    pub type_url: String,

    /// 简短标题，用于概括错误。
    #[schema(example = "Internal Server Error")]
    pub title: String,

    /// HTTP 状态码（与响应 status 一致）。
    #[schema(example = 500)]
    pub status: u16,

    /// 人类可读的详细信息（尽量稳定，不建议依赖解析）。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// 稳定的错误码，用于程序化处理。
    #[schema(example = "STORAGE_UNAVAILABLE")]
    pub code: String,

    /// 可选：请求追踪 ID。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ImageDecode(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::MissingCapability(_) => StatusCode::NOT_IMPLEMENTED,
            AppError::Json(_) => StatusCode::BAD_REQUEST,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Io(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn stable_code(&self) -> &'static str {
        match self {
            AppError::ImageDecode(_) => "IMAGE_DECODE_FAILED",
            AppError::Storage(_) => "STORAGE_UNAVAILABLE",
            AppError::MissingCapability(_) => "MISSING_CAPABILITY",
            AppError::Json(_) => "BAD_REQUEST",
            AppError::Validation(_) => "VALIDATION_FAILED",
            AppError::Io(_) => "IO_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn title(&self) -> &'static str {
        match self.status_code() {
            StatusCode::BAD_REQUEST => "Bad Request",
            StatusCode::UNPROCESSABLE_ENTITY => "Validation Failed",
            StatusCode::NOT_IMPLEMENTED => "Not Implemented",
            StatusCode::SERVICE_UNAVAILABLE => "Service Unavailable",
            StatusCode::INTERNAL_SERVER_ERROR => "Internal Server Error",
            _ => "Error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let problem = ProblemDetails {
            type_url: "about:blank".to_string(),
            title: self.title().to_string(),
            status: status.as_u16(),
            detail: Some(self.to_string()),
            code: self.stable_code().to_string(),
            request_id: crate::request_id::current_request_id(),
        };

        let mut res = Json(problem).into_response();
        *res.status_mut() = status;
        res.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/problem+json"),
        );
        res
    }
}

// =============== Error conversions for common external errors ===============

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Json(err.to_string())
    }
}

impl From<image::ImageError> for AppError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::Decoding(_)
            | image::ImageError::Unsupported(_)
            | image::ImageError::Limits(_) => AppError::ImageDecode(err.to_string()),
            _ => AppError::Internal(format!("图片处理失败: {err}")),
        }
    }
}

#[cfg(feature = "npz")]
impl From<zip::result::ZipError> for AppError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => AppError::Io(e.to_string()),
            other => AppError::Internal(format!("写入 npz 归档失败: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AppError;
    use axum::http::StatusCode;

    #[test]
    fn storage_errors_map_to_service_unavailable() {
        let err: AppError = sqlx::Error::PoolClosed.into();
        assert!(matches!(err, AppError::Storage(_)));
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.stable_code(), "STORAGE_UNAVAILABLE");
    }

    #[test]
    fn corrupt_image_bytes_become_decode_error() {
        let err: AppError = image::load_from_memory(b"not an image at all")
            .expect_err("garbage must not decode")
            .into();
        assert!(matches!(err, AppError::ImageDecode(_)), "got: {err:?}");
    }
}
