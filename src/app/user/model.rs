//! 用户数据模型

use chrono::{DateTime, Utc};
use std::fmt;
use validator::{Validate, ValidationError};

use crate::core::Model;

/// 用户角色
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Role {
    Admin,
    #[default]
    User,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    /// 严格解析，只接受 `admin` 和 `user`
    pub fn parse(value: &str) -> Option<Role> {
        match value.trim() {
            "admin" => Some(Role::Admin),
            "user" => Some(Role::User),
            _ => None,
        }
    }

    /// 宽松解析：除 `admin` 以外一律视为 `user`
    pub fn coerce(value: &str) -> Role {
        match value.trim() {
            "admin" => Role::Admin,
            _ => Role::User,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Role {
    type Error = UnknownRole;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Role::parse(&value).ok_or(UnknownRole(value))
    }
}

/// 用户记录
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model for User {
    const TABLE: &'static str = "users";
    const COLUMNS: &'static [(&'static str, &'static str)] = &[
        ("id", "INTEGER PRIMARY KEY AUTOINCREMENT"),
        ("name", "VARCHAR(120) NOT NULL"),
        ("email", "VARCHAR(180) NOT NULL UNIQUE"),
        (
            "role",
            "TEXT NOT NULL DEFAULT 'user' CHECK (role IN ('admin', 'user'))",
        ),
        ("created_at", "DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP"),
        ("updated_at", "DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP"),
    ];
}

/// 所有查询共用的列列表
pub(crate) const USER_COLUMNS: &str = "id, name, email, role, created_at, updated_at";

/// 创建用户请求
#[derive(Debug, Clone, Validate)]
pub struct NewUser {
    #[validate(length(min = 1, max = 120, message = "name must be between 1 and 120 characters"))]
    pub name: String,

    #[validate(
        length(min = 1, max = 180, message = "email must be between 1 and 180 characters"),
        email(message = "email must be a valid address"),
        custom(function = "validate_email_domain")
    )]
    pub email: String,

    pub role: Role,
}

impl NewUser {
    /// 去掉首尾空白后构造
    pub fn new(name: &str, email: &str, role: Role) -> Self {
        Self {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            role,
        }
    }
}

/// 部分更新：`None` 或空白表示保持原值
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    /// 非 `admin`/`user` 的值会被忽略
    pub role: Option<String>,
}

impl UserChanges {
    /// 从终端输入构造，空白输入视为未提供
    pub fn from_input(name: &str, email: &str, role: &str) -> Self {
        Self {
            name: non_blank(name),
            email: non_blank(email),
            role: non_blank(role),
        }
    }

    pub(crate) fn into_patch(self) -> UserPatch {
        UserPatch {
            name: self.name.as_deref().and_then(non_blank),
            email: self.email.as_deref().and_then(non_blank),
            role: self.role.as_deref().and_then(Role::parse),
        }
    }
}

/// 规范化后的更新内容
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub(crate) struct UserPatch {
    #[validate(length(min = 1, max = 120, message = "name must be between 1 and 120 characters"))]
    pub name: Option<String>,

    #[validate(
        length(min = 1, max = 180, message = "email must be between 1 and 180 characters"),
        email(message = "email must be a valid address"),
        custom(function = "validate_email_domain")
    )]
    pub email: Option<String>,

    pub role: Option<Role>,
}

/// 域名必须带顶级域，如 `x.com`；`email` 校验本身接受 `ana@x`
fn validate_email_domain(email: &str) -> Result<(), ValidationError> {
    // 没有 `@` 的情况由 `email` 校验报告
    let Some((_, domain)) = email.rsplit_once('@') else {
        return Ok(());
    };

    let has_tld = match domain.rsplit_once('.') {
        Some((host, tld)) => {
            !host.is_empty()
                && host.split('.').all(|label| !label.is_empty())
                && (tld.starts_with("xn--")
                    || (tld.chars().count() >= 2 && tld.chars().all(char::is_alphabetic)))
        }
        None => false,
    };

    if has_tld {
        return Ok(());
    }

    let mut error = ValidationError::new("email_domain");
    error.message = Some("email must be a valid address".into());
    Err(error)
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// 计数过滤条件
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub role: Option<Role>,
}

impl UserFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn role(role: Role) -> Self {
        Self { role: Some(role) }
    }
}

/// 按角色统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserStats {
    pub total: i64,
    pub admins: i64,
    pub users: i64,
}
