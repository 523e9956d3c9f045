// ==========================================
// 表格导入 - 行提取器
// ==========================================
// 职责: 一行原始数据 → 属性表（列取值 / 整行派生）
// 红线: 无跨行状态，除调用派生函数外无副作用
// ==========================================

use crate::domain::cell::is_truthy_str;
use crate::domain::{AttributeMap, FieldMapping, FieldSpec, FieldValue, Row};
use crate::importer::error::{ImportError, ImportResult};

#[derive(Debug, Clone, Copy, Default)]
pub struct RowExtractor;

impl RowExtractor {
    /// 按映射表解析一行
    ///
    /// # 规则
    /// - attribute 缺失或为假值（"" / "0"）→ ConfigError
    /// - value 缺失或为假值列引用（Index(0) / "" / "0"）→ ConfigError
    /// - 派生函数接收整行
    /// - 列引用要求列存在于行中（存在即可，不要求有内容）→ 否则 LookupError
    /// - 同名属性后者覆盖前者
    pub fn extract(&self, row: &Row, mapping: &FieldMapping) -> ImportResult<AttributeMap> {
        let mut attributes = AttributeMap::new();

        for field in mapping.iter() {
            let (attribute, value) = Self::check_field(field)?;

            let resolved = match value {
                FieldValue::Derive(derive) => derive(row),
                FieldValue::Column(key) => {
                    row.get(key)
                        .cloned()
                        .ok_or_else(|| ImportError::LookupError {
                            row: None,
                            column: key.clone(),
                        })?
                }
            };

            attributes.insert(attribute.to_string(), resolved);
        }

        Ok(attributes)
    }

    /// 只校验映射表本身（不读取行）
    pub fn check_mapping(&self, mapping: &FieldMapping) -> ImportResult<()> {
        for field in mapping.iter() {
            Self::check_field(field)?;
        }
        Ok(())
    }

    fn check_field(field: &FieldSpec) -> ImportResult<(&str, &FieldValue)> {
        let attribute = match field.attribute.as_deref() {
            Some(attribute) if is_truthy_str(attribute) => attribute,
            _ => {
                return Err(ImportError::ConfigError(
                    "字段配置缺少 attribute".to_string(),
                ))
            }
        };

        match &field.value {
            Some(value) if value.is_truthy() => Ok((attribute, value)),
            _ => Err(ImportError::ConfigError(format!(
                "字段 `{}` 缺少 value",
                attribute
            ))),
        }
    }
}
