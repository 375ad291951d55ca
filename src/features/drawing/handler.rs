use axum::{
    Router,
    body::Bytes,
    extract::{DefaultBodyLimit, State, rejection::BytesRejection},
    http::StatusCode,
    response::Json,
    routing::post,
};
use serde_json::Value;

use crate::error::AppError;
use crate::features::image::{TargetSize, normalize_data_uri};
use crate::state::AppState;

use super::models::{SaveDrawingRequest, SaveDrawingResponse, SaveStatus, normalize_username};

const SUCCESS_MESSAGE: &str = "Drawing saved successfully!";
const INVALID_REQUEST_MESSAGE: &str = "Invalid request";

/// 解析 `digit` 字段：接受 JSON 整数，或可解析为整数的字符串。
fn parse_digit(raw: Option<&Value>) -> Result<i64, AppError> {
    match raw {
        None | Some(Value::Null) => Err(AppError::Validation("缺少字段 digit".into())),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                    .map(|f| f as i64)
            })
            .ok_or_else(|| AppError::Validation(format!("digit 不是整数: {n}"))),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| AppError::Validation(format!("digit 不是整数: {s:?}"))),
        Some(other) => Err(AppError::Validation(format!("digit 不是整数: {other}"))),
    }
}

async fn process_submission(
    state: &AppState,
    body: Result<Bytes, BytesRejection>,
) -> Result<SaveDrawingResponse, AppError> {
    let body = body.map_err(|e| AppError::Validation(format!("读取请求体失败: {}", e.body_text())))?;
    let req: SaveDrawingRequest = serde_json::from_slice(&body)?;

    let label = parse_digit(req.digit.as_ref())?;
    let image = req
        .image
        .ok_or_else(|| AppError::Validation("缺少字段 image".into()))?;
    let username = normalize_username(req.username.as_deref());

    if !(0..=9).contains(&label) {
        tracing::warn!(
            target: "digit_collector::drawing",
            "标签超出 0-9 范围，仍按原值保存: label={label}, username={username}"
        );
    }

    // 解码与重采样是 CPU 密集操作，放到阻塞线程池
    let normalized =
        tokio::task::spawn_blocking(move || normalize_data_uri(&image, TargetSize::Small))
            .await
            .map_err(|e| AppError::Internal(format!("归一化任务异常: {e}")))??;

    let id = state.store.insert(&username, label, &normalized).await?;
    let user_count = state.store.count_by_username(&username).await?;
    let total_count = state.store.count_all().await?;
    let new_digit = state.picker.next_digit();

    tracing::info!(
        target: "digit_collector::drawing",
        "已保存手写数字: id={id}, username={username}, label={label}, total={total_count}"
    );

    Ok(SaveDrawingResponse {
        status: SaveStatus::Success,
        message: SUCCESS_MESSAGE.to_string(),
        id: Some(id),
        user_count: Some(user_count),
        total_count: Some(total_count),
        new_digit: Some(new_digit),
    })
}

#[utoipa::path(
    post,
    path = "/save-drawing/",
    summary = "提交一幅手写数字",
    description = "将画布导出的图片归一化为 28×28 灰度 PNG 后入库，返回该用户与全站的累计数量以及下一轮要画的数字。任何失败均以 400 + `{status:\"error\", message}` 返回，不写入记录。",
    request_body = SaveDrawingRequest,
    responses(
        (status = 200, description = "保存成功", body = SaveDrawingResponse),
        (status = 400, description = "请求非法/图片无法解码/存储失败", body = SaveDrawingResponse)
    ),
    tag = "Drawing"
)]
pub async fn save_drawing(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> (StatusCode, Json<SaveDrawingResponse>) {
    match process_submission(&state, body).await {
        Ok(resp) => (StatusCode::OK, Json(resp)),
        Err(e) => {
            tracing::warn!(target: "digit_collector::drawing", "提交被拒绝: {e}");
            (
                StatusCode::BAD_REQUEST,
                Json(SaveDrawingResponse::error(e.to_string())),
            )
        }
    }
}

/// 非 POST 方法访问提交端点时的统一回应
async fn invalid_method() -> (StatusCode, Json<SaveDrawingResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(SaveDrawingResponse::error(INVALID_REQUEST_MESSAGE)),
    )
}

pub fn create_drawing_router(max_payload_bytes: usize) -> Router<AppState> {
    Router::<AppState>::new().route(
        "/save-drawing/",
        post(save_drawing)
            .fallback(invalid_method)
            .layer(DefaultBodyLimit::max(max_payload_bytes)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn digit_accepts_integers_and_integer_strings() {
        assert_eq!(parse_digit(Some(&json!(7))).unwrap(), 7);
        assert_eq!(parse_digit(Some(&json!("4"))).unwrap(), 4);
        assert_eq!(parse_digit(Some(&json!(" 12 "))).unwrap(), 12);
        assert_eq!(parse_digit(Some(&json!(3.0))).unwrap(), 3);
        assert_eq!(parse_digit(Some(&json!(-1))).unwrap(), -1);
    }

    #[test]
    fn digit_rejects_missing_or_non_integer_values() {
        let cases = [
            json!(null),
            json!("seven"),
            json!(2.5),
            json!([1]),
            json!(true),
            // 超出 i64 范围的浮点不能饱和成极值
            json!(1e20),
            json!(-1e20),
        ];
        for bad in cases {
            assert!(
                matches!(parse_digit(Some(&bad)), Err(AppError::Validation(_))),
                "{bad} should be rejected"
            );
        }
        assert!(matches!(parse_digit(None), Err(AppError::Validation(_))));
    }
}
