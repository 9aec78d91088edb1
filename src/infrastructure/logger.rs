//! 日志基础设施

use tracing_subscriber::EnvFilter;

use crate::config::{ConfigError, LoggingConfig};

pub struct Logger;

impl Logger {
    /// 初始化全局日志，输出到 stderr，不与菜单输出混在一起
    pub fn init(config: &LoggingConfig) -> Result<(), ConfigError> {
        let filter = EnvFilter::try_new(&config.level)
            .map_err(|e| ConfigError::Validation(format!("invalid logging level: {}", e)))?;

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact()
            .try_init()
            .map_err(|e| ConfigError::Logging(e.to_string()))?;

        Ok(())
    }
}
