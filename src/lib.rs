//! # usercrud
//!
//! 基于 SQLite 的交互式用户管理工具，分层如下：
//! - `app`：交互菜单、终端输入输出和用户仓储
//! - `core`：错误类型和模型抽象
//! - `infrastructure`：数据库连接管理和日志
//! - `config`：TOML 配置

pub mod app;
pub mod config;
pub mod core;
pub mod infrastructure;

pub use crate::core::{CoreError, CoreResult};
