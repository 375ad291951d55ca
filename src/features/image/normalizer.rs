//! 图片归一化：data URI → 解码 → 灰度 → 缩放 → PNG → data URI。
//!
//! 提交入库（28×28）与导出（28/280）共用同一条流水线；导出 numpy 时改为输出灰度字节数组。

use std::io::Cursor;

use base64::{Engine as _, engine::general_purpose::STANDARD as base64_engine};
use image::{DynamicImage, GrayImage, ImageFormat, imageops::FilterType};

use crate::error::AppError;

use super::types::{DEFAULT_SCHEME_TAG, GrayRaster, TargetSize};

/// 拆分 `"<scheme>,<payload>"`；不含逗号时整串视为 payload。
pub fn split_data_uri(input: &str) -> (Option<&str>, &str) {
    match input.split_once(',') {
        Some((scheme, payload)) => (Some(scheme), payload),
        None => (None, input),
    }
}

/// 解码并转换为目标尺寸的灰度图。源图已是目标尺寸时跳过重采样。
pub fn decode_to_gray(input: &str, target: TargetSize) -> Result<GrayImage, AppError> {
    let (_, payload) = split_data_uri(input);
    let bytes = base64_engine
        .decode(payload.trim())
        .map_err(|e| AppError::ImageDecode(format!("base64 解码失败: {e}")))?;
    // 截断的数据流在 image 中报告为 IoError，这里统一归为解码失败
    let gray = image::load_from_memory(&bytes)
        .map_err(|e| AppError::ImageDecode(format!("图片解码失败: {e}")))?
        .to_luma8();

    let side = target.side();
    if gray.dimensions() == (side, side) {
        return Ok(gray);
    }
    Ok(image::imageops::resize(&gray, side, side, FilterType::Lanczos3))
}

/// 将任意格式的图片 data URI 归一化为 `target×target` 的灰度 PNG data URI。
///
/// 输出沿用输入的 scheme 头；裸 base64 输入使用 [`DEFAULT_SCHEME_TAG`]。
pub fn normalize_data_uri(input: &str, target: TargetSize) -> Result<String, AppError> {
    let scheme = split_data_uri(input).0.unwrap_or(DEFAULT_SCHEME_TAG);
    let gray = decode_to_gray(input, target)?;

    let mut png = Vec::new();
    DynamicImage::ImageLuma8(gray)
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| AppError::Internal(format!("PNG 编码失败: {e}")))?;

    Ok(format!("{scheme},{}", base64_engine.encode(png)))
}

/// 与 [`normalize_data_uri`] 相同的解码/缩放流程，但输出行优先的 u8 灰度数组。
pub fn data_uri_to_array(input: &str, target: TargetSize) -> Result<GrayRaster, AppError> {
    let gray = decode_to_gray(input, target)?;
    Ok(GrayRaster {
        side: target.side(),
        pixels: gray.into_raw(),
    })
}
