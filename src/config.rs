use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 全局配置单例
static CONFIG: OnceCell<AppConfig> = OnceCell::new();

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 监听地址
    pub host: String,
    /// 监听端口
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite 文件路径
    #[serde(default = "DatabaseConfig::default_sqlite_path")]
    pub sqlite_path: String,
    /// 是否启用 WAL
    #[serde(default = "DatabaseConfig::default_wal")]
    pub wal: bool,
}

impl DatabaseConfig {
    fn default_sqlite_path() -> String {
        "./resources/digits.db".to_string()
    }
    fn default_wal() -> bool {
        true
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            sqlite_path: Self::default_sqlite_path(),
            wal: Self::default_wal(),
        }
    }
}

/// 资源配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourcesConfig {
    /// 页面模板目录；存在 `index.html.jinja` 时覆盖内置首页模板
    #[serde(default = "ResourcesConfig::default_templates_dir")]
    pub templates_dir: String,
}

impl ResourcesConfig {
    fn default_templates_dir() -> String {
        "./resources/templates".to_string()
    }
}

impl Default for ResourcesConfig {
    fn default() -> Self {
        Self {
            templates_dir: Self::default_templates_dir(),
        }
    }
}

/// 绘图提交配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawingConfig {
    /// 单次提交请求体上限（字节）
    #[serde(default = "DrawingConfig::default_max_payload_bytes")]
    pub max_payload_bytes: usize,
    /// 排行榜条数（1-100）
    #[serde(default = "DrawingConfig::default_leaderboard_limit")]
    pub leaderboard_limit: i64,
}

impl DrawingConfig {
    fn default_max_payload_bytes() -> usize {
        2 * 1024 * 1024
    }
    fn default_leaderboard_limit() -> i64 {
        10
    }

    /// 归一化后的排行榜条数
    pub fn effective_leaderboard_limit(&self) -> i64 {
        self.leaderboard_limit.clamp(1, 100)
    }
}

impl Default for DrawingConfig {
    fn default() -> Self {
        Self {
            max_payload_bytes: Self::default_max_payload_bytes(),
            leaderboard_limit: Self::default_leaderboard_limit(),
        }
    }
}

/// CORS 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// 是否启用 CORS
    #[serde(default = "CorsConfig::default_enabled")]
    pub enabled: bool,
    /// 允许的 Origin 列表（支持 "*" 表示任意）
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    /// 允许的方法列表（支持 "*" 表示任意）
    #[serde(default)]
    pub allowed_methods: Vec<String>,
    /// 允许的请求头列表（支持 "*" 表示任意）
    #[serde(default)]
    pub allowed_headers: Vec<String>,
    /// 预检缓存时间（秒）
    #[serde(default)]
    pub max_age_secs: Option<u64>,
}

impl CorsConfig {
    fn default_enabled() -> bool {
        false
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            allowed_origins: Vec::new(),
            allowed_methods: Vec::new(),
            allowed_headers: Vec::new(),
            max_age_secs: None,
        }
    }
}

/// 优雅退出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShutdownConfig {
    /// 优雅退出超时时间（秒）
    #[serde(default = "ShutdownConfig::default_timeout")]
    pub timeout_secs: u64,
}

impl ShutdownConfig {
    fn default_timeout() -> u64 {
        30
    }

    /// 获取优雅退出超时时间
    pub fn timeout_duration(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            timeout_secs: Self::default_timeout(),
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub resources: ResourcesConfig,
    /// 绘图提交与排行榜
    #[serde(default)]
    pub drawing: DrawingConfig,
    /// CORS 配置
    #[serde(default)]
    pub cors: CorsConfig,
    /// 优雅退出配置
    #[serde(default)]
    pub shutdown: ShutdownConfig,
}

impl AppConfig {
    /// 从配置文件加载配置（文件可缺省），支持环境变量覆盖
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::get_config_path();

        tracing::info!("正在从 {:?} 加载配置文件", config_path);

        let builder = ConfigBuilder::builder()
            .add_source(File::from(config_path).required(false))
            // 支持环境变量覆盖，例如：APP_SERVER__PORT
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        builder.try_deserialize()
    }

    /// 获取全局配置单例
    ///
    /// 未调用 `init_global()` 时返回默认配置（便于测试与命令行工具直接使用）。
    pub fn global() -> &'static AppConfig {
        CONFIG.get_or_init(AppConfig::default)
    }

    /// 初始化全局配置
    pub fn init_global() -> Result<(), ConfigError> {
        let config = Self::load()?;
        CONFIG
            .set(config)
            .map_err(|_| ConfigError::Message("配置已经被初始化".to_string()))?;
        Ok(())
    }

    /// 获取配置文件路径
    fn get_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    /// 获取服务器监听地址
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// 获取模板目录
    pub fn templates_path(&self) -> PathBuf {
        PathBuf::from(&self.resources.templates_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, DrawingConfig};

    #[test]
    fn defaults_are_usable_without_config_file() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.server_addr(), "0.0.0.0:8000");
        assert_eq!(cfg.drawing.effective_leaderboard_limit(), 10);
        assert!(cfg.database.sqlite_path.ends_with("digits.db"));
    }

    #[test]
    fn leaderboard_limit_is_clamped() {
        let cfg = DrawingConfig {
            leaderboard_limit: 0,
            ..DrawingConfig::default()
        };
        assert_eq!(cfg.effective_leaderboard_limit(), 1);
        let cfg = DrawingConfig {
            leaderboard_limit: 10_000,
            ..DrawingConfig::default()
        };
        assert_eq!(cfg.effective_leaderboard_limit(), 100);
    }

    #[test]
    fn partial_toml_falls_back_to_section_defaults() {
        let cfg: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(
                "[server]\nport = 9100\n[drawing]\nleaderboard_limit = 5\n",
                config::FileFormat::Toml,
            ))
            .build()
            .expect("build config")
            .try_deserialize()
            .expect("deserialize config");
        assert_eq!(cfg.server.port, 9100);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.drawing.leaderboard_limit, 5);
        assert_eq!(cfg.drawing.max_payload_bytes, 2 * 1024 * 1024);
    }
}
