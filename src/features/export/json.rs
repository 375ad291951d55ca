use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use chrono::SecondsFormat;
use serde::Serialize;

use crate::error::AppError;
use crate::features::drawing::DrawingRecord;

/// JSON 导出中的单条记录
#[derive(Debug, Serialize)]
pub struct JsonRecord {
    pub id: i64,
    pub username: String,
    pub label: i64,
    /// 重新归一化后的 data URI
    pub image: String,
    pub created_at: String,
}

impl JsonRecord {
    pub fn new(record: &DrawingRecord, image: String) -> Self {
        Self {
            id: record.id,
            username: record.username.clone(),
            label: record.digit_label,
            image,
            created_at: record
                .created_at
                .to_rfc3339_opts(SecondsFormat::Micros, false),
        }
    }
}

/// 以 2 空格缩进写出完整数组
pub fn write_json(path: &Path, records: &[JsonRecord]) -> Result<(), AppError> {
    let mut out = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut out, records)?;
    out.flush()?;
    Ok(())
}
