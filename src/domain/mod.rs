// ==========================================
// 表格导入 - 领域模型层
// ==========================================
// 职责: 单元格、行、字段映射等纯数据类型
// 红线: 不含数据访问逻辑,不含导入流程
// ==========================================

pub mod cell;
pub mod mapping;

// 重导出核心类型
pub use cell::{CellValue, ColumnKey, Row};
pub use mapping::{AttributeMap, Derivation, FieldMapping, FieldSpec, FieldValue};
