//! 核心层：错误类型和模型抽象

pub mod error;
pub mod model;

pub use error::{CoreError, CoreResult};
pub use model::Model;
