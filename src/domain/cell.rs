// ==========================================
// 表格导入 - 单元格与行类型
// ==========================================
// 职责: 原始单元格值 / 列标识 / 行
// 红线: 行只读，行号由所在序列位置决定，不存于行内
// ==========================================

use rusqlite::types::{ToSql, ToSqlOutput, Value};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;

// i64 可精确表示的浮点区间 [-2^63, 2^63)
const I64_MIN_F: f64 = -9_223_372_036_854_775_808.0;
const I64_MAX_F: f64 = 9_223_372_036_854_775_808.0;

// ==========================================
// CellValue - 原始单元格值
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl CellValue {
    /// 空值判定（Empty 或全空白字符串）
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// 数值视图（字符串会尝试解析）
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Int(i) => Some(*i as f64),
            CellValue::Float(f) => Some(*f),
            CellValue::String(s) => s.trim().parse::<f64>().ok(),
            CellValue::Bool(_) | CellValue::Empty => None,
        }
    }

    /// 整数视图（无小数部分的浮点数也接受）
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Int(i) => Some(*i),
            CellValue::Float(f) if f.fract() == 0.0 && (I64_MIN_F..I64_MAX_F).contains(f) => {
                Some(*f as i64)
            }
            CellValue::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
    }

    /// 文本单元格：空字符串视为 Empty
    pub fn from_text(raw: &str) -> Self {
        if raw.is_empty() {
            CellValue::Empty
        } else {
            CellValue::String(raw.to_string())
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Int(i) => write!(f, "{}", i),
            CellValue::Float(v) => write!(f, "{}", v),
            CellValue::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::String(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::String(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Int(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Empty)
    }
}

impl ToSql for CellValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let value = match self {
            CellValue::Empty => Value::Null,
            CellValue::Bool(b) => Value::Integer(*b as i64),
            CellValue::Int(i) => Value::Integer(*i),
            CellValue::Float(f) => Value::Real(*f),
            CellValue::String(s) => Value::Text(s.clone()),
        };
        Ok(ToSqlOutput::Owned(value))
    }
}

// ==========================================
// ColumnKey - 列标识
// ==========================================
// Index: 原始表格网格的列位置（A=0）
// Name:  表头命名的列 / 手工构造的行
// 十进制整数形式的列名（"1"）归一为 Index，与数组键语义一致
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum ColumnKey {
    Index(usize),
    Name(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawColumnKey {
    Index(usize),
    Name(String),
}

impl<'de> Deserialize<'de> for ColumnKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawColumnKey::deserialize(deserializer)? {
            RawColumnKey::Index(i) => ColumnKey::Index(i),
            RawColumnKey::Name(name) => ColumnKey::from(name),
        })
    }
}

// "0" / "12" 视为整数键；"01" / "+1" / " 1" 保持为列名
fn parse_index_key(name: &str) -> Option<usize> {
    let canonical = name == "0"
        || (!name.is_empty()
            && !name.starts_with('0')
            && name.bytes().all(|b| b.is_ascii_digit()));
    if canonical {
        name.parse().ok()
    } else {
        None
    }
}

impl ColumnKey {
    /// 宽松真值判定：Index(0) / "" / "0" 视为缺失
    ///
    /// 注意: 这会拒绝首列的位置引用，见 DESIGN.md OQ-1
    pub fn is_truthy(&self) -> bool {
        match self {
            ColumnKey::Index(i) => *i != 0,
            ColumnKey::Name(name) => is_truthy_str(name),
        }
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKey::Index(i) => write!(f, "{}", i),
            ColumnKey::Name(name) => write!(f, "{}", name),
        }
    }
}

impl From<usize> for ColumnKey {
    fn from(value: usize) -> Self {
        ColumnKey::Index(value)
    }
}

impl From<&str> for ColumnKey {
    fn from(value: &str) -> Self {
        match parse_index_key(value) {
            Some(i) => ColumnKey::Index(i),
            None => ColumnKey::Name(value.to_string()),
        }
    }
}

impl From<String> for ColumnKey {
    fn from(value: String) -> Self {
        match parse_index_key(&value) {
            Some(i) => ColumnKey::Index(i),
            None => ColumnKey::Name(value),
        }
    }
}

/// 字符串真值判定（"" 与 "0" 为假）
pub(crate) fn is_truthy_str(value: &str) -> bool {
    !value.is_empty() && value != "0"
}

// ==========================================
// Row - 一行原始数据
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: HashMap<ColumnKey, CellValue>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按位置构造（列标识为 Index(0..n)）
    pub fn from_cells<I>(cells: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<CellValue>,
    {
        Self {
            cells: cells
                .into_iter()
                .enumerate()
                .map(|(idx, cell)| (ColumnKey::Index(idx), cell.into()))
                .collect(),
        }
    }

    /// 按列名构造
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<ColumnKey>,
        V: Into<CellValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            cells: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn insert(&mut self, key: impl Into<ColumnKey>, value: impl Into<CellValue>) {
        self.cells.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &ColumnKey) -> Option<&CellValue> {
        self.cells.get(key)
    }

    /// 列是否存在（与是否有内容无关）
    pub fn contains(&self, key: &ColumnKey) -> bool {
        self.cells.contains_key(key)
    }

    /// 所有单元格均为空
    pub fn is_blank(&self) -> bool {
        self.cells.values().all(CellValue::is_blank)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ColumnKey, &CellValue)> {
        self.cells.iter()
    }
}
