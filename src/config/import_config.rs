// ==========================================
// 表格导入 - 单次导入配置
// ==========================================
// 职责: 从 JSON 加载导入选项与列映射
// 说明: 派生字段无法序列化，需在代码中追加到映射表
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::domain::{ColumnKey, FieldMapping, FieldSpec, FieldValue};
use crate::importer::error::{ImportError, ImportResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ==========================================
// FieldConfig - 单条列映射
// ==========================================
// 缺项保留为 None，在构建阶段报配置错误
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    #[serde(default)]
    pub attribute: Option<String>,
    #[serde(default)]
    pub column: Option<ColumnKey>, // 列名或列位置
}

// ==========================================
// ImporterConfig - 导入配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImporterConfig {
    pub file_path: PathBuf,                // 源文件（相对路径/~ 在导入时解析）
    #[serde(default)]
    pub skip_first_row: Option<bool>,      // 未设置时取 ImportConfigReader 默认值
    #[serde(default)]
    pub skip_blank_rows: Option<bool>,     // 同上
    #[serde(default)]
    pub scenario: Option<String>,          // 同上
    #[serde(default)]
    pub fields: Vec<FieldConfig>,          // 列映射
}

/// 合并默认值后的导入选项
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOptions {
    pub skip_first_row: bool,
    pub skip_blank_rows: bool,
    pub scenario: Option<String>,
}

impl ImporterConfig {
    pub fn from_json_str(raw: &str) -> ImportResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ImportResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ImportError::ConfigReadError {
            key: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&raw)
    }

    /// 列映射 → FieldMapping
    pub fn field_mapping(&self) -> FieldMapping {
        self.fields
            .iter()
            .map(|f| FieldSpec {
                attribute: f.attribute.clone(),
                value: f.column.clone().map(FieldValue::Column),
            })
            .collect::<Vec<_>>()
            .into()
    }

    /// 显式配置优先，其余取默认值
    pub fn resolve_options(&self, defaults: &dyn ImportConfigReader) -> ImportResult<ResolvedOptions> {
        let skip_first_row = match self.skip_first_row {
            Some(v) => v,
            None => defaults.get_skip_first_row()?,
        };
        let skip_blank_rows = match self.skip_blank_rows {
            Some(v) => v,
            None => defaults.get_skip_blank_rows()?,
        };
        let scenario = match &self.scenario {
            Some(s) => Some(s.clone()),
            None => defaults.get_default_scenario()?,
        };

        Ok(ResolvedOptions {
            skip_first_row,
            skip_blank_rows,
            scenario,
        })
    }
}
