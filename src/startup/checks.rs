use crate::config::AppConfig;
use crate::error::AppError;
use crate::features::home::{INDEX_TEMPLATE, PageRenderer};
use std::fs;
use std::path::Path;

/// 执行启动检查
///
/// 1. 确保 SQLite 文件所在目录存在
/// 2. 报告首页模板来源（模板目录覆盖 / 内置）
pub async fn run_startup_checks(config: &AppConfig) -> Result<(), AppError> {
    tracing::info!("🔍 开始执行启动检查...");

    ensure_database_dir(Path::new(&config.database.sqlite_path))?;
    report_template_source(&config.templates_path());

    tracing::info!("✅ 启动检查完成");
    Ok(())
}

/// 确保数据库文件的父目录存在
pub fn ensure_database_dir(db_path: &Path) -> Result<(), AppError> {
    let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };

    if parent.exists() {
        tracing::info!("✅ 数据目录已存在: {:?}", parent);
    } else {
        tracing::warn!("📁 未找到数据目录，正在创建: {:?}", parent);
        fs::create_dir_all(parent)
            .map_err(|e| AppError::Internal(format!("创建数据目录失败: {e}")))?;
        tracing::info!("✅ 数据目录创建成功");
    }
    Ok(())
}

fn report_template_source(templates_dir: &Path) {
    if PageRenderer::has_override(templates_dir) {
        tracing::info!(
            "🧩 首页模板: {:?}",
            templates_dir.join(INDEX_TEMPLATE)
        );
    } else {
        tracing::info!("🧩 未找到 {INDEX_TEMPLATE}，使用内置首页模板");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn creates_missing_parent_directory() {
        let root = std::env::temp_dir().join(format!("digits_{}", Uuid::new_v4()));
        let db = root.join("nested").join("digits.db");
        ensure_database_dir(&db).expect("create dir");
        assert!(root.join("nested").is_dir());
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn bare_file_name_needs_no_directory() {
        ensure_database_dir(Path::new("digits.db")).expect("no-op");
    }
}
