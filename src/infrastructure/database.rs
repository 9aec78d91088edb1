//! 数据库基础设施

use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
    ConnectOptions, Row,
};
use std::str::FromStr;
use tracing::{debug, info};

use crate::config::{DatabaseConfig, SyncOptions};
use crate::core::{CoreError, CoreResult, Model};

/// 进程内唯一的存储句柄
pub struct DatabaseManager {
    pool: SqlitePool,
}

impl DatabaseManager {
    /// 创建延迟连接的连接池，此时不会访问数据库文件
    pub fn new(config: &DatabaseConfig) -> CoreResult<Self> {
        let options = if config.is_memory() {
            SqliteConnectOptions::from_str("sqlite::memory:")?
        } else {
            SqliteConnectOptions::new()
                .filename(&config.path)
                .create_if_missing(true)
        };

        let options = if config.log_statements {
            options
        } else {
            options.disable_statement_logging()
        };

        // 单连接，且不回收空闲连接：内存数据库随连接关闭而消失
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_lazy_with(options);

        Ok(Self { pool })
    }

    /// 验证存储可以访问
    pub async fn authenticate(&self) -> CoreResult<()> {
        let result: i64 = sqlx::query_scalar("SELECT 1 + 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| CoreError::Connection(e.to_string()))?;

        debug!("Database answered {}", result);
        info!("Database connection established");
        Ok(())
    }

    /// 按模型定义建表
    ///
    /// - 默认：表不存在时创建
    /// - `force`：删除后重建，优先于 `alter`
    /// - `alter`：在事务中重建表并保留两边共有的列
    pub async fn sync<M: Model>(&self, options: SyncOptions) -> CoreResult<()> {
        if options.force {
            info!("Recreating table {}", M::TABLE);
            sqlx::query(&format!("DROP TABLE IF EXISTS {}", M::TABLE))
                .execute(&self.pool)
                .await?;
        } else if options.alter && self.table_exists(M::TABLE).await? {
            return self.alter::<M>().await;
        }

        sqlx::query(&M::create_table_sql(true))
            .execute(&self.pool)
            .await?;

        info!("Table {} is ready", M::TABLE);
        Ok(())
    }

    async fn alter<M: Model>(&self) -> CoreResult<()> {
        let existing = self.table_columns(M::TABLE).await?;
        let shared = M::column_names()
            .into_iter()
            .filter(|name| existing.iter().any(|column| column.as_str() == *name))
            .collect::<Vec<_>>()
            .join(", ");
        let backup = format!("{}_backup", M::TABLE);

        info!("Migrating table {} (keeping columns: {})", M::TABLE, shared);

        let mut tx = self.pool.begin().await?;

        sqlx::query(&format!("DROP TABLE IF EXISTS {}", backup))
            .execute(&mut *tx)
            .await?;
        sqlx::query(&format!("ALTER TABLE {} RENAME TO {}", M::TABLE, backup))
            .execute(&mut *tx)
            .await?;
        sqlx::query(&M::create_table_sql(false))
            .execute(&mut *tx)
            .await?;

        if !shared.is_empty() {
            sqlx::query(&format!(
                "INSERT INTO {table} ({cols}) SELECT {cols} FROM {backup}",
                table = M::TABLE,
                cols = shared,
                backup = backup
            ))
            .execute(&mut *tx)
            .await?;
        }

        // 重命名时自增计数跟随备份表，需转回新表，已删除的 ID 不得复用
        let has_sequence = sqlx::query(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'sqlite_sequence'",
        )
        .fetch_optional(&mut *tx)
        .await?
        .is_some();

        if has_sequence {
            let seq: Option<i64> =
                sqlx::query_scalar("SELECT seq FROM sqlite_sequence WHERE name = ?")
                    .bind(&backup)
                    .fetch_optional(&mut *tx)
                    .await?;

            if let Some(seq) = seq {
                sqlx::query("UPDATE sqlite_sequence SET seq = ? WHERE name = ? AND seq < ?")
                    .bind(seq)
                    .bind(M::TABLE)
                    .bind(seq)
                    .execute(&mut *tx)
                    .await?;
                sqlx::query(
                    "INSERT INTO sqlite_sequence (name, seq) SELECT ?, ? \
                     WHERE NOT EXISTS (SELECT 1 FROM sqlite_sequence WHERE name = ?)",
                )
                .bind(M::TABLE)
                .bind(seq)
                .bind(M::TABLE)
                .execute(&mut *tx)
                .await?;
            }
        }

        sqlx::query(&format!("DROP TABLE {}", backup))
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn table_exists(&self, table: &str) -> CoreResult<bool> {
        let found = sqlx::query("SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?")
            .bind(table)
            .fetch_optional(&self.pool)
            .await?;

        Ok(found.is_some())
    }

    /// 表的现有列名
    pub async fn table_columns(&self, table: &str) -> CoreResult<Vec<String>> {
        let rows = sqlx::query(&format!("PRAGMA table_info({})", table))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(|row| row.get::<String, _>("name"))
            .collect())
    }

    pub fn get_pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
