//! 核心模型抽象

/// 可持久化的模型
///
/// 连接管理器通过它建表、删表和迁移，而不关心具体实体。
pub trait Model {
    /// 表名
    const TABLE: &'static str;

    /// 列定义：(列名, 列的 DDL)
    const COLUMNS: &'static [(&'static str, &'static str)];

    /// 生成 `CREATE TABLE` 语句
    fn create_table_sql(if_not_exists: bool) -> String {
        let columns = Self::COLUMNS
            .iter()
            .map(|(name, definition)| format!("{} {}", name, definition))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "CREATE TABLE {}{} ({})",
            if if_not_exists { "IF NOT EXISTS " } else { "" },
            Self::TABLE,
            columns
        )
    }

    fn column_names() -> Vec<&'static str> {
        Self::COLUMNS.iter().map(|(name, _)| *name).collect()
    }
}
