//! 基础设施层：数据库连接和日志

pub mod database;
pub mod logger;

pub use database::DatabaseManager;
pub use logger::Logger;
