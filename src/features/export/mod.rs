//! 离线导出：按创建时间读取全部记录，重新归一化后写为 JSON 或 `.npz`。

pub mod json;
#[cfg(feature = "npz")]
pub mod npy;
#[cfg(feature = "npz")]
pub mod npz;

use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::AppError;
use crate::features::drawing::DrawingStore;
#[cfg(feature = "npz")]
use crate::features::image::data_uri_to_array;
use crate::features::image::{TargetSize, normalize_data_uri};

use json::JsonRecord;
#[cfg(feature = "npz")]
use npy::NpyArray;

/// 每处理多少条记录回调一次进度
pub const PROGRESS_EVERY: usize = 100;

pub const DEFAULT_OUTPUT: &str = "digits_export.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Json,
    /// numpy `.npz`（images / labels / usernames）
    Numpy,
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "numpy" => Ok(ExportFormat::Numpy),
            other => Err(format!("不支持的导出格式 {other}（仅支持 json 或 numpy）")),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ExportFormat::Json => "json",
            ExportFormat::Numpy => "numpy",
        })
    }
}

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub output: PathBuf,
    pub format: ExportFormat,
    pub size: TargetSize,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_OUTPUT),
            format: ExportFormat::Json,
            size: TargetSize::Small,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// 库中没有任何记录，未写文件
    Empty,
    Written {
        path: PathBuf,
        count: usize,
        /// numpy 导出时 images 数组的形状 `(N, T, T)`
        shape: Option<(usize, usize, usize)>,
    },
}

/// 实际写入的文件路径：numpy 导出与 `savez_compressed` 一致，缺少 `.npz` 后缀时补上。
pub fn resolve_output_path(output: &Path, format: ExportFormat) -> PathBuf {
    match format {
        ExportFormat::Json => output.to_path_buf(),
        ExportFormat::Numpy => {
            if output.extension().is_some_and(|ext| ext == "npz") {
                output.to_path_buf()
            } else {
                let mut s = output.as_os_str().to_os_string();
                s.push(".npz");
                PathBuf::from(s)
            }
        }
    }
}

/// 执行一次导出。任一记录解码失败即中止，且不会留下输出文件。
pub async fn run_export(
    store: &DrawingStore,
    opts: &ExportOptions,
    mut on_progress: impl FnMut(usize, usize),
) -> Result<ExportOutcome, AppError> {
    let total = store.count_all().await?;
    if total == 0 {
        tracing::warn!(target: "digit_collector::export", "库中没有可导出的记录");
        return Ok(ExportOutcome::Empty);
    }
    let records = store.list_all_ordered().await?;
    let total = records.len();
    let path = resolve_output_path(&opts.output, opts.format);
    tracing::info!(
        target: "digit_collector::export",
        "开始导出 {total} 条记录: format={}, size={}, output={}",
        opts.format,
        opts.size,
        path.display()
    );

    let outcome = match opts.format {
        ExportFormat::Json => {
            let mut rows = Vec::with_capacity(total);
            for (i, record) in records.iter().enumerate() {
                report(i + 1, total, &mut on_progress);
                let image = normalize_data_uri(&record.image_data, opts.size)?;
                rows.push(JsonRecord::new(record, image));
            }
            json::write_json(&path, &rows)?;
            ExportOutcome::Written {
                path,
                count: total,
                shape: None,
            }
        }
        #[cfg(feature = "npz")]
        ExportFormat::Numpy => export_numpy(&records, &path, opts.size, &mut on_progress)?,
        #[cfg(not(feature = "npz"))]
        ExportFormat::Numpy => {
            return Err(AppError::MissingCapability(
                "numpy 导出需要启用 `npz` 特性（cargo build --features npz）".into(),
            ));
        }
    };

    tracing::info!(target: "digit_collector::export", "导出完成: {total} 条");
    Ok(outcome)
}

fn report(done: usize, total: usize, on_progress: &mut impl FnMut(usize, usize)) {
    if done % PROGRESS_EVERY == 0 {
        on_progress(done, total);
    }
}

#[cfg(feature = "npz")]
fn export_numpy(
    records: &[crate::features::drawing::DrawingRecord],
    path: &Path,
    size: TargetSize,
    on_progress: &mut impl FnMut(usize, usize),
) -> Result<ExportOutcome, AppError> {
    let total = records.len();
    let side = size.side() as usize;
    let mut rasters = Vec::with_capacity(total);
    let mut labels = Vec::with_capacity(total);
    let mut usernames = Vec::with_capacity(total);
    for (i, record) in records.iter().enumerate() {
        report(i + 1, total, on_progress);
        rasters.push(data_uri_to_array(&record.image_data, size)?.pixels);
        labels.push(record.digit_label);
        usernames.push(record.username.clone());
    }
    let images = NpyArray::stacked_u8(side, &rasters);
    let labels = NpyArray::i64_vector(&labels);
    let usernames = NpyArray::unicode_vector(&usernames);
    npz::write_npz(
        path,
        &[
            ("images", &images),
            ("labels", &labels),
            ("usernames", &usernames),
        ],
    )?;
    Ok(ExportOutcome::Written {
        path: path.to_path_buf(),
        count: total,
        shape: Some((total, side, side)),
    })
}
