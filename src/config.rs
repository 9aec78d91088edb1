use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// 默认配置文件查找路径
const CONFIG_PATHS: [&str; 2] = ["config.toml", "./config/config.toml"];

/// `EnvFilter` 接受的日志级别
const LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

/// 内存数据库的特殊路径
pub const MEMORY_PATH: &str = ":memory:";

/// 应用配置
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 数据库配置
    pub database: DatabaseConfig,
    /// 日志配置
    pub logging: LoggingConfig,
}

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite 文件路径，相对于工作目录；`:memory:` 表示内存数据库
    pub path: PathBuf,
    /// 是否记录 SQL 语句
    pub log_statements: bool,
    /// 启动时的建表选项
    pub sync: SyncOptions,
}

/// 建表选项
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SyncOptions {
    /// 删除并重建表
    pub force: bool,
    /// 就地迁移列定义
    pub alter: bool,
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志过滤指令，如 `warn` 或 `info,sqlx=debug`
    pub level: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("database.sqlite"),
            log_statements: false,
            sync: SyncOptions::default(),
        }
    }
}

impl DatabaseConfig {
    /// 内存数据库配置，主要用于测试
    pub fn in_memory() -> Self {
        Self {
            path: PathBuf::from(MEMORY_PATH),
            ..Self::default()
        }
    }

    pub fn is_memory(&self) -> bool {
        self.path == Path::new(MEMORY_PATH)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        // 默认只输出警告，避免打断交互菜单
        Self {
            level: "warn".to_string(),
        }
    }
}

impl Config {
    /// 从配置文件加载配置
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::FileRead(e.to_string()))?;

        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        Ok(config)
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "database path must not be empty".to_string(),
            ));
        }

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::Validation(
                "logging level must not be empty".to_string(),
            ));
        }

        for directive in self.logging.level.split(',') {
            let directive = directive.trim();
            // `target=level` 只检查级别部分
            let level = match directive.rsplit_once('=') {
                Some((_, level)) => level.trim(),
                None => directive,
            };

            if !LEVELS.iter().any(|known| known.eq_ignore_ascii_case(level)) {
                return Err(ConfigError::Validation(format!(
                    "unknown logging level: {}",
                    directive
                )));
            }
        }

        Ok(())
    }
}

/// 配置错误类型
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    FileRead(String),
    #[error("failed to parse config: {0}")]
    Parse(String),
    #[error("invalid config: {0}")]
    Validation(String),
    #[error("failed to initialize logging: {0}")]
    Logging(String),
}

/// 从文件或默认值加载并验证配置
pub fn load_config() -> Result<Config, ConfigError> {
    let config = match CONFIG_PATHS.iter().find(|path| Path::new(path).exists()) {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };

    config.validate()?;
    Ok(config)
}
