//! 用户仓储：带校验的增删改查

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{info, warn};
use validator::Validate;

use super::model::{
    NewUser, Role, User, UserChanges, UserFilter, UserStats, USER_COLUMNS,
};
use crate::core::{CoreError, CoreResult};

#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 创建用户，邮箱重复时返回校验错误
    pub async fn create(&self, new_user: NewUser) -> CoreResult<User> {
        new_user.validate()?;

        if self.email_taken(&new_user.email, None).await? {
            warn!("Rejected duplicate email: {}", new_user.email);
            return Err(CoreError::Validation("email must be unique".to_string()));
        }

        let now = Utc::now();
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (name, email, role, created_at, updated_at) VALUES (?, ?, ?, ?, ?) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(new_user.role.as_str())
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        info!("Created user: {} ({})", user.name, user.id);
        Ok(user)
    }

    /// 按 ID 升序返回全部用户
    pub async fn list_all(&self) -> CoreResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users ORDER BY id ASC",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// 找不到时返回 `None`
    pub async fn find_by_id(&self, id: i64) -> CoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = ?",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// 找不到时返回 `None`
    pub async fn find_by_email(&self, email: &str) -> CoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = ?",
            USER_COLUMNS
        ))
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// 只修改非空字段，无效角色被忽略；用户不存在时返回 `None`
    pub async fn update(&self, id: i64, changes: UserChanges) -> CoreResult<Option<User>> {
        let patch = changes.into_patch();
        patch.validate()?;

        if let Some(email) = &patch.email {
            if self.email_taken(email, Some(id)).await? {
                warn!("Rejected duplicate email for user {}: {}", id, email);
                return Err(CoreError::Validation("email must be unique".to_string()));
            }
        }

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE users SET ");
        {
            let mut fields = query.separated(", ");
            if let Some(name) = &patch.name {
                fields.push("name = ").push_bind_unseparated(name.clone());
            }
            if let Some(email) = &patch.email {
                fields.push("email = ").push_bind_unseparated(email.clone());
            }
            if let Some(role) = patch.role {
                fields.push("role = ").push_bind_unseparated(role.as_str());
            }
            fields.push("updated_at = ").push_bind_unseparated(Utc::now());
        }
        query.push(" WHERE id = ").push_bind(id);
        query.push(format!(" RETURNING {}", USER_COLUMNS));

        let user = query
            .build_query_as::<User>()
            .fetch_optional(&self.pool)
            .await?;

        if let Some(user) = &user {
            info!("Updated user: {} ({})", user.name, user.id);
        }

        Ok(user)
    }

    /// 删除用户，返回是否真的删除了记录
    pub async fn delete(&self, id: i64) -> CoreResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        info!("Deleted user: {}", id);
        Ok(true)
    }

    pub async fn count(&self, filter: &UserFilter) -> CoreResult<i64> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT COUNT(*) FROM users");
        if let Some(role) = filter.role {
            query.push(" WHERE role = ").push_bind(role.as_str());
        }

        let (count,): (i64,) = query.build_query_as().fetch_one(&self.pool).await?;
        Ok(count)
    }

    pub async fn stats(&self) -> CoreResult<UserStats> {
        Ok(UserStats {
            total: self.count(&UserFilter::all()).await?,
            admins: self.count(&UserFilter::role(Role::Admin)).await?,
            users: self.count(&UserFilter::role(Role::User)).await?,
        })
    }

    async fn email_taken(&self, email: &str, except_id: Option<i64>) -> CoreResult<bool> {
        let existing = sqlx::query("SELECT id FROM users WHERE email = ? AND id IS NOT ?")
            .bind(email)
            .bind(except_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(existing.is_some())
    }
}
