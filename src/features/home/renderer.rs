use std::path::{Path, PathBuf};

use minijinja::{AutoEscape, Environment};
use serde::Serialize;

use crate::error::AppError;
use crate::features::leaderboard::models::LeaderboardEntry;

/// 首页模板名；模板目录下同名文件优先于内置模板
pub const INDEX_TEMPLATE: &str = "index.html.jinja";

const BUILTIN_INDEX: &str = include_str!("../../../resources/templates/index.html.jinja");

/// 用户名等上下文一律按 HTML 转义，与模板文件后缀无关
fn html_env() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| AutoEscape::Html);
    env
}

/// 首页渲染上下文
#[derive(Debug, Serialize)]
pub struct IndexContext {
    pub digit_to_draw: u8,
    pub total_drawings: i64,
    pub leaderboard: Vec<LeaderboardEntry>,
}

/// 首页模板渲染器。模板目录缺失或不含 `index.html.jinja` 时使用编译进二进制的模板。
pub struct PageRenderer {
    env: Environment<'static>,
}

impl PageRenderer {
    pub fn new(templates_dir: impl Into<PathBuf>) -> Self {
        let disk = minijinja::path_loader(templates_dir.into());
        let mut env = html_env();
        env.set_loader(move |name| match disk(name)? {
            Some(source) => Ok(Some(source)),
            None if name == INDEX_TEMPLATE => Ok(Some(BUILTIN_INDEX.to_string())),
            None => Ok(None),
        });
        Self { env }
    }

    /// 仅使用内置模板
    pub fn builtin() -> Result<Self, AppError> {
        Self::from_source(BUILTIN_INDEX)
    }

    fn from_source(source: &'static str) -> Result<Self, AppError> {
        let mut env = html_env();
        env.add_template(INDEX_TEMPLATE, source)
            .map_err(|e| AppError::Internal(format!("解析首页模板失败: {e}")))?;
        Ok(Self { env })
    }

    /// 模板目录中是否存在覆盖用的首页模板
    pub fn has_override(templates_dir: &Path) -> bool {
        templates_dir.join(INDEX_TEMPLATE).is_file()
    }

    pub fn render_index(&self, ctx: &IndexContext) -> Result<String, AppError> {
        let tpl = self
            .env
            .get_template(INDEX_TEMPLATE)
            .map_err(|e| AppError::Internal(format!("加载首页模板失败: {e}")))?;
        tpl.render(ctx)
            .map_err(|e| AppError::Internal(format!("渲染首页模板失败: {e}")))
    }
}
