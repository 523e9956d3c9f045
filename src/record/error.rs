// ==========================================
// 表格导入 - 记录层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 记录层错误不向导入核心抛出，save() 中记录日志并返回 false
// ==========================================

use thiserror::Error;

/// 记录层错误类型
#[derive(Error, Debug)]
pub enum RecordError {
    // ===== 结构错误 =====
    #[error("表结构无效: {0}")]
    SchemaError(String),

    // ===== 数据库错误 =====
    #[error("数据库锁获取失败: {0}")]
    LockError(String),

    #[error("唯一约束违反: {0}")]
    UniqueConstraintViolation(String),

    #[error("数据库查询失败: {0}")]
    DatabaseQueryError(String),

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<rusqlite::Error>
impl From<rusqlite::Error> for RecordError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) if msg.contains("UNIQUE") => {
                RecordError::UniqueConstraintViolation(msg)
            }
            _ => RecordError::DatabaseQueryError(err.to_string()),
        }
    }
}

/// Result 类型别名
pub type RecordResult<T> = Result<T, RecordError>;
