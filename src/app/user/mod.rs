//! 用户管理

pub mod handler;
pub mod model;
pub mod repository;

pub use model::{NewUser, Role, User, UserChanges, UserFilter, UserStats};
pub use repository::UserRepository;
