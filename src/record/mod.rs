// ==========================================
// 表格导入 - 记录层
// ==========================================
// 职责: 定义导入核心所依赖的记录能力接口，并提供 SQLite 实现
// 红线: 导入核心只依赖 ActiveRecord，不关心校验规则与存储细节
// ==========================================

pub mod error;
pub mod rules;
pub mod table_record;

use crate::domain::AttributeMap;
use std::collections::BTreeMap;
use std::fmt::Debug;

// 重导出核心类型
pub use error::{RecordError, RecordResult};
pub use rules::{AttributeRule, Rule, RuleSet, DEFAULT_SCENARIO};
pub use table_record::{TableRecord, TableRecordFactory, TableSchema};

/// 属性名 → 该属性的第一条错误信息
pub type FirstErrors = BTreeMap<String, String>;

// ==========================================
// ActiveRecord Trait
// ==========================================
// 用途: 一行数据对应的记录实例
// 实现者: TableRecord（rusqlite）
pub trait ActiveRecord {
    /// 主键类型（落库后产生）
    type Key: Clone + Debug;

    /// 设置校验场景（在赋值之前调用）
    fn set_scenario(&mut self, scenario: &str);

    /// 一次性设置全部属性
    fn set_attributes(&mut self, attributes: AttributeMap);

    /// 执行记录自身的校验，返回是否通过
    fn validate(&mut self) -> bool;

    /// 每个未通过属性的第一条错误
    fn first_errors(&self) -> FirstErrors;

    /// 落库，返回是否成功（失败不抛错）
    fn save(&mut self) -> bool;

    /// 落库后的主键
    fn primary_key(&self) -> Option<Self::Key>;
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::domain::CellValue;

    /// 测试用记录：required 中的属性不能为空，reject_save 时保存失败
    #[derive(Debug, Clone, Default)]
    pub struct MockRecord {
        pub seq: u64,
        pub scenario: Option<String>,
        pub attributes: AttributeMap,
        pub required: Vec<&'static str>,
        pub reject_save: bool,
        pub errors: FirstErrors,
        pub key: Option<u64>,
        pub validate_calls: usize,
    }

    impl MockRecord {
        pub fn new(seq: u64, required: &[&'static str]) -> Self {
            Self {
                seq,
                required: required.to_vec(),
                ..Self::default()
            }
        }
    }

    impl ActiveRecord for MockRecord {
        type Key = u64;

        fn set_scenario(&mut self, scenario: &str) {
            self.scenario = Some(scenario.to_string());
        }

        fn set_attributes(&mut self, attributes: AttributeMap) {
            self.attributes.extend(attributes);
        }

        fn validate(&mut self) -> bool {
            self.validate_calls += 1;
            self.errors.clear();
            for attribute in &self.required {
                let blank = self
                    .attributes
                    .get(*attribute)
                    .map(CellValue::is_blank)
                    .unwrap_or(true);
                if blank {
                    self.errors
                        .insert(attribute.to_string(), format!("{} 不能为空", attribute));
                }
            }
            self.errors.is_empty()
        }

        fn first_errors(&self) -> FirstErrors {
            self.errors.clone()
        }

        fn save(&mut self) -> bool {
            if !self.validate() || self.reject_save {
                return false;
            }
            self.key = Some(self.seq);
            true
        }

        fn primary_key(&self) -> Option<u64> {
            self.key
        }
    }
}
