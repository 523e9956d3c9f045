// ==========================================
// 表格导入 - 字段映射定义
// ==========================================
// 职责: 行 → 属性 的映射规格
// 红线: 映射在会话开始后只读，所有行共享
// ==========================================

use crate::domain::cell::{CellValue, ColumnKey, Row};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// 属性名 → 解析后的值
pub type AttributeMap = BTreeMap<String, CellValue>;

/// 派生函数：读取整行，返回属性值
pub type Derivation = Arc<dyn Fn(&Row) -> CellValue + Send + Sync>;

// ==========================================
// FieldValue - 取值方式
// ==========================================
#[derive(Clone)]
pub enum FieldValue {
    Column(ColumnKey), // 直接按列取值
    Derive(Derivation), // 由整行计算
}

impl FieldValue {
    pub fn column(key: impl Into<ColumnKey>) -> Self {
        FieldValue::Column(key.into())
    }

    pub fn derive<F>(derive: F) -> Self
    where
        F: Fn(&Row) -> CellValue + Send + Sync + 'static,
    {
        FieldValue::Derive(Arc::new(derive))
    }

    /// 派生函数恒为真；列引用沿用宽松真值判定
    pub fn is_truthy(&self) -> bool {
        match self {
            FieldValue::Column(key) => key.is_truthy(),
            FieldValue::Derive(_) => true,
        }
    }
}

impl fmt::Debug for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Column(key) => f.debug_tuple("Column").field(key).finish(),
            FieldValue::Derive(_) => f.write_str("Derive(<fn>)"),
        }
    }
}

// ==========================================
// FieldSpec - 单条映射
// ==========================================
// attribute / value 缺失时在提取阶段报配置错误
#[derive(Debug, Clone, Default)]
pub struct FieldSpec {
    pub attribute: Option<String>,
    pub value: Option<FieldValue>,
}

impl FieldSpec {
    pub fn column(attribute: impl Into<String>, key: impl Into<ColumnKey>) -> Self {
        Self {
            attribute: Some(attribute.into()),
            value: Some(FieldValue::column(key)),
        }
    }

    pub fn derived<F>(attribute: impl Into<String>, derive: F) -> Self
    where
        F: Fn(&Row) -> CellValue + Send + Sync + 'static,
    {
        Self {
            attribute: Some(attribute.into()),
            value: Some(FieldValue::derive(derive)),
        }
    }
}

// ==========================================
// FieldMapping - 有序映射表
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct FieldMapping {
    fields: Vec<FieldSpec>,
}

impl FieldMapping {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    /// 追加一条映射（构建期使用）
    pub fn with(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<Vec<FieldSpec>> for FieldMapping {
    fn from(fields: Vec<FieldSpec>) -> Self {
        Self::new(fields)
    }
}
