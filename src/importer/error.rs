// ==========================================
// 表格导入 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 范围: 致命错误（配置/文件/查找），在任何记录产生前抛出
// 说明: 行级校验/保存失败不走此类型，由 ImportSession 按行累积
// ==========================================

use crate::domain::ColumnKey;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xlsm/.xlsb/.xls/.ods/.csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    // ===== 字段映射错误 =====
    #[error("字段配置错误: {0}")]
    ConfigError(String),

    #[error(
        "列 `{column}` 在行中不存在{}",
        .row.map(|r| format!(" (行 {})", r)).unwrap_or_default()
    )]
    LookupError { row: Option<usize>, column: ColumnKey },

    // ===== 配置错误 =====
    #[error("配置读取失败 (key: {key}): {message}")]
    ConfigReadError { key: String, message: String },

    // ===== 数据库错误 =====
    #[error("数据库查询失败: {0}")]
    DatabaseQueryError(String),

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ImportError {
    /// 为列查找错误补充行号（其他错误原样返回）
    pub fn at_row(self, index: usize) -> Self {
        match self {
            ImportError::LookupError { row: None, column } => ImportError::LookupError {
                row: Some(index),
                column,
            },
            other => other,
        }
    }

    /// 是否为配置类错误（映射缺项 / 列查找失败）
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ImportError::ConfigError(_) | ImportError::LookupError { .. }
        )
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<rusqlite::Error>
impl From<rusqlite::Error> for ImportError {
    fn from(err: rusqlite::Error) -> Self {
        ImportError::DatabaseQueryError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

// 实现 From<serde_json::Error>
impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        ImportError::ConfigError(format!("配置解析失败: {}", err))
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
