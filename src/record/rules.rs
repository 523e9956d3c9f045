// ==========================================
// 表格导入 - 记录校验规则
// ==========================================
// 职责: 按场景执行属性级规则，产出每属性第一条错误
// 规则: Required 检查空值；其余规则对空值跳过
// ==========================================

use crate::domain::{AttributeMap, CellValue};
use crate::record::FirstErrors;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// 未显式设置场景时使用的场景名
pub const DEFAULT_SCENARIO: &str = "default";

// ==========================================
// Rule - 单条规则
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Rule {
    Required,                                        // 非空
    Integer,                                         // 整数
    Number { min: Option<f64>, max: Option<f64> },   // 数值范围（含边界）
    MaxLength { max: usize },                        // 最大字符数
    OneOf { values: Vec<String> },                   // 枚举值
}

impl Rule {
    /// 校验单个值，返回默认错误信息
    fn check(&self, attribute: &str, value: Option<&CellValue>) -> Option<String> {
        let value = match (self, value) {
            (Rule::Required, v) if v.map(CellValue::is_blank).unwrap_or(true) => {
                return Some(format!("{} 不能为空", attribute));
            }
            (Rule::Required, _) => return None,
            (_, None) => return None,
            (_, Some(v)) if v.is_blank() => return None,
            (_, Some(v)) => v,
        };

        match self {
            Rule::Required => None,
            Rule::Integer => match value.as_i64() {
                Some(_) => None,
                None => Some(format!("{} 必须为整数", attribute)),
            },
            Rule::Number { min, max } => {
                let n = match value.as_f64() {
                    Some(n) => n,
                    None => return Some(format!("{} 必须为数字", attribute)),
                };
                if let Some(min) = min {
                    if n < *min {
                        return Some(format!("{} 不能小于 {}", attribute, min));
                    }
                }
                if let Some(max) = max {
                    if n > *max {
                        return Some(format!("{} 不能大于 {}", attribute, max));
                    }
                }
                None
            }
            Rule::MaxLength { max } => {
                if value.to_string().chars().count() > *max {
                    Some(format!("{} 长度不能超过 {} 个字符", attribute, max))
                } else {
                    None
                }
            }
            Rule::OneOf { values } => {
                let text = value.to_string();
                if values.iter().any(|v| *v == text) {
                    None
                } else {
                    Some(format!("{} 的值无效: {}", attribute, text))
                }
            }
        }
    }
}

// ==========================================
// AttributeRule - 规则绑定
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeRule {
    pub attributes: Vec<String>,          // 作用属性
    pub rule: Rule,                       // 规则
    #[serde(default)]
    pub on: Vec<String>,                  // 生效场景（空 = 全部场景）
    #[serde(default)]
    pub message: Option<String>,          // 自定义错误信息
}

impl AttributeRule {
    fn applies_to(&self, scenario: &str) -> bool {
        self.on.is_empty() || self.on.iter().any(|s| s == scenario)
    }
}

// ==========================================
// RuleSet - 规则集
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    rules: Vec<AttributeRule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加对所有场景生效的规则
    pub fn rule(self, attributes: &[&str], rule: Rule) -> Self {
        self.rule_on(attributes, rule, &[])
    }

    /// 添加仅在指定场景生效的规则
    pub fn rule_on(mut self, attributes: &[&str], rule: Rule, scenarios: &[&str]) -> Self {
        self.rules.push(AttributeRule {
            attributes: attributes.iter().map(|a| a.to_string()).collect(),
            rule,
            on: scenarios.iter().map(|s| s.to_string()).collect(),
            message: None,
        });
        self
    }

    /// 添加完整的规则绑定（自定义信息等）
    pub fn push(mut self, rule: AttributeRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// 当前场景下有规则约束的属性
    pub fn active_attributes(&self, scenario: &str) -> BTreeSet<String> {
        self.rules
            .iter()
            .filter(|r| r.applies_to(scenario))
            .flat_map(|r| r.attributes.iter().cloned())
            .collect()
    }

    /// 按规则顺序校验，每个属性只保留第一条错误
    pub fn validate(&self, scenario: &str, attributes: &AttributeMap) -> FirstErrors {
        let mut errors = FirstErrors::new();

        for binding in self.rules.iter().filter(|r| r.applies_to(scenario)) {
            for attribute in &binding.attributes {
                if errors.contains_key(attribute) {
                    continue;
                }
                if let Some(default_message) = binding.rule.check(attribute, attributes.get(attribute)) {
                    let message = binding
                        .message
                        .as_ref()
                        .map(|m| m.replace("{attribute}", attribute))
                        .unwrap_or(default_message);
                    errors.insert(attribute.clone(), message);
                }
            }
        }

        errors
    }
}
