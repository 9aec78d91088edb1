//! 应用层：交互菜单和用户管理

pub mod menu;
pub mod terminal;
pub mod user;

pub use menu::{Menu, MenuOption};
pub use terminal::Terminal;
