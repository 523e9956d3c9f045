// ==========================================
// 表格导入 - 核心库
// ==========================================
// 职责: 表格行映射为记录，逐行校验，仅保存有效记录并报告失败行
// 技术栈: Rust + calamine/csv + SQLite
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 单元格/行/字段映射
pub mod domain;

// 导入层 - 读取、提取、构建、会话
pub mod importer;

// 记录层 - 记录接口、校验规则、SQLite 实现
pub mod record;

// 配置层 - 导入配置与默认项
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

pub use domain::{AttributeMap, CellValue, ColumnKey, FieldMapping, FieldSpec, FieldValue, Row};

pub use importer::{
    ImportError, ImportOutcome, ImportResult, ImportSession, RecordBuilder, RowExtractor,
    SheetImporter, TabularReader,
};

pub use record::{ActiveRecord, FirstErrors, Rule, RuleSet, TableRecord, TableRecordFactory, TableSchema};

pub use config::{ConfigManager, ImportConfigReader, ImporterConfig};

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
