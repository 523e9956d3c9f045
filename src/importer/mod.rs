// ==========================================
// 表格导入 - 导入层
// ==========================================
// 职责: 表格行 → 记录 → 校验 → 落库
// 支持: Excel, CSV
// ==========================================

// 模块声明
pub mod error;
pub mod file_parser;
pub mod importer_trait;
pub mod record_builder;
pub mod row_extractor;
pub mod session;
pub mod sheet_importer;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvReader, ExcelReader, UniversalReader};
pub use record_builder::RecordBuilder;
pub use row_extractor::RowExtractor;
pub use session::{ImportOutcome, ImportSession};
pub use sheet_importer::{resolve_file_path, SheetImporter};

// 重导出 Trait 接口
pub use importer_trait::TabularReader;
