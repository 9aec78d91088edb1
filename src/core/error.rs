//! 核心错误处理模块

use sqlx::error::ErrorKind;
use tracing::error;

/// 核心错误类型
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// 字段缺失、格式错误或邮箱重复
    #[error("Validation error: {0}")]
    Validation(String),
    /// 启动时无法连接存储
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),
    #[error("Terminal error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl From<sqlx::Error> for CoreError {
    fn from(err: sqlx::Error) -> Self {
        // 约束冲突属于可恢复的校验错误
        if let Some(db_err) = err.as_database_error() {
            match db_err.kind() {
                ErrorKind::UniqueViolation => {
                    return CoreError::Validation("email must be unique".to_string());
                }
                ErrorKind::CheckViolation | ErrorKind::NotNullViolation => {
                    return CoreError::Validation(db_err.message().to_string());
                }
                _ => {}
            }
        }

        error!("Database error: {}", err);
        CoreError::Database(err)
    }
}

impl From<validator::ValidationErrors> for CoreError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = err
            .field_errors()
            .into_iter()
            .flat_map(|(_, errors)| {
                errors.iter().map(|error| {
                    error
                        .message
                        .as_ref()
                        .map(|msg| msg.to_string())
                        .unwrap_or_else(|| "Validation error".to_string())
                })
            })
            .collect();

        // field_errors 基于 HashMap，排序保证输出稳定
        messages.sort();
        messages.dedup();
        CoreError::Validation(messages.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::{ValidationError, ValidationErrors};

    #[test]
    fn test_validation_errors_are_joined() {
        let mut errors = ValidationErrors::new();
        let mut length = ValidationError::new("length");
        length.message = Some("name is required".into());
        errors.add("name", length);
        errors.add("email", ValidationError::new("email"));

        match CoreError::from(errors) {
            CoreError::Validation(msg) => {
                assert_eq!(msg, "Validation error, name is required");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_row_not_found_is_database_error() {
        let err = CoreError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, CoreError::Database(_)));
    }
}
