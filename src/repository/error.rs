// ==========================================
// 赛车零件追踪系统 - 仓储层错误类型
// ==========================================
// 职责: SQLite 错误分类（唯一约束 / 外键 / 其他），供上层区分冲突与故障
// 说明: 在用零件号唯一由部分唯一索引兜底，冲突统一归为 UniqueConstraintViolation
// ==========================================

use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("记录不存在: {entity}(id={id})")]
    NotFound { entity: String, id: String },

    #[error("数据库锁获取失败: {0}")]
    LockError(String),

    #[error("SQL 执行失败: {0}")]
    DatabaseQueryError(String),

    #[error("唯一约束冲突: {0}")]
    UniqueConstraintViolation(String),

    #[error("外键约束冲突: {0}")]
    ForeignKeyViolation(String),

    /// 写入前校验失败（例如零件已退役）
    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    /// extra_fields / options 等 JSON 列编解码失败
    #[error("列 {field} 编解码失败: {message}")]
    SerializationError { field: String, message: String },
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(code, msg) => {
                let detail = msg.unwrap_or_else(|| code.to_string());
                match code.extended_code {
                    rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                        RepositoryError::UniqueConstraintViolation(detail)
                    }
                    rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                        RepositoryError::ForeignKeyViolation(detail)
                    }
                    _ => RepositoryError::DatabaseQueryError(detail),
                }
            }
            other => RepositoryError::DatabaseQueryError(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;
