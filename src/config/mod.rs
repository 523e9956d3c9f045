// ==========================================
// 表格导入 - 配置层
// ==========================================
// 职责: 单次导入配置（JSON）+ 导入默认项（config_kv 表）
// ==========================================

pub mod config_manager;
pub mod import_config;
pub mod import_config_trait;

// 重导出核心配置类型
pub use config_manager::{config_keys, ConfigManager};
pub use import_config::{FieldConfig, ImporterConfig, ResolvedOptions};
pub use import_config_trait::{ImportConfigReader, ImportDefaults};
