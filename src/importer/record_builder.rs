// ==========================================
// 表格导入 - 记录构建器
// ==========================================
// 职责: 每行构建一条记录，按行号存放
// 红线: 行号不重排；任一行提取失败则整体失败，不返回部分结果
// ==========================================

use crate::domain::{FieldMapping, Row};
use crate::importer::error::ImportResult;
use crate::importer::row_extractor::RowExtractor;
use crate::record::ActiveRecord;
use std::collections::BTreeMap;
use tracing::{debug, error};

#[derive(Debug, Clone, Copy, Default)]
pub struct RecordBuilder {
    extractor: RowExtractor,
}

impl RecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 构建记录集
    ///
    /// # 参数
    /// - rows: 有序行序列（下标即行号）
    /// - mapping: 字段映射表
    /// - factory: 记录构造函数
    /// - scenario: 校验场景（非空时在赋值前设置）
    ///
    /// # 返回
    /// - Ok(BTreeMap<行号, 记录>)
    /// - Err: ConfigError / LookupError（带行号）
    pub fn build<R, F>(
        &self,
        rows: &[Row],
        mapping: &FieldMapping,
        factory: F,
        scenario: Option<&str>,
    ) -> ImportResult<BTreeMap<usize, R>>
    where
        R: ActiveRecord,
        F: Fn() -> R,
    {
        // 映射表缺项与行内容无关，先于任何记录构造报出
        self.extractor.check_mapping(mapping)?;

        let scenario = scenario.filter(|s| !s.is_empty());
        let mut records = BTreeMap::new();

        for (index, row) in rows.iter().enumerate() {
            let mut record = factory();
            if let Some(scenario) = scenario {
                record.set_scenario(scenario);
            }

            let attributes = self.extractor.extract(row, mapping).map_err(|e| {
                let e = e.at_row(index);
                error!(row = index, error = %e, "行提取失败，终止构建");
                e
            })?;
            record.set_attributes(attributes);

            records.insert(index, record);
        }

        debug!(count = records.len(), "记录构建完成");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CellValue, FieldSpec, FieldValue};
    use crate::importer::error::ImportError;
    use crate::record::testing::MockRecord;
    use std::cell::Cell;

    fn rows() -> Vec<Row> {
        vec![
            Row::from_pairs([("name", "A"), ("age", "30")]),
            Row::from_pairs([("name", ""), ("age", "40")]),
            Row::from_pairs([("name", "C"), ("age", "50")]),
        ]
    }

    fn mapping() -> FieldMapping {
        FieldMapping::default()
            .with(FieldSpec::column("name", "name"))
            .with(FieldSpec::column("age", "age"))
    }

    #[test]
    fn test_build_one_record_per_row() {
        let records = RecordBuilder::new()
            .build(&rows(), &mapping(), || MockRecord::new(0, &[]), None)
            .unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records.keys().copied().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(records[&2].attributes.get("name"), Some(&CellValue::from("C")));
    }

    #[test]
    fn test_build_applies_scenario() {
        let records = RecordBuilder::new()
            .build(&rows(), &mapping(), || MockRecord::new(0, &[]), Some("import"))
            .unwrap();

        assert!(records
            .values()
            .all(|r| r.scenario.as_deref() == Some("import")));
    }

    #[test]
    fn test_build_ignores_empty_scenario() {
        let records = RecordBuilder::new()
            .build(&rows(), &mapping(), || MockRecord::new(0, &[]), Some(""))
            .unwrap();

        assert!(records.values().all(|r| r.scenario.is_none()));
    }

    #[test]
    fn test_build_lookup_error_aborts_with_row() {
        let mut input = rows();
        input[1] = Row::from_pairs([("name", "B")]);

        let result = RecordBuilder::new().build(&input, &mapping(), || MockRecord::new(0, &[]), None);

        match result {
            Err(ImportError::LookupError { row, .. }) => assert_eq!(row, Some(1)),
            other => panic!("unexpected result: {:?}", other.map(|r| r.len())),
        }
    }

    #[test]
    fn test_build_bad_mapping_creates_no_records() {
        let created = Cell::new(0usize);
        let bad = mapping().with(FieldSpec {
            attribute: Some("email".to_string()),
            value: None,
        });

        let result = RecordBuilder::new().build(
            &rows(),
            &bad,
            || {
                created.set(created.get() + 1);
                MockRecord::new(0, &[])
            },
            None,
        );

        assert!(matches!(result, Err(ImportError::ConfigError(_))));
        assert_eq!(created.get(), 0);
    }

    #[test]
    fn test_build_bad_mapping_fails_even_without_rows() {
        let bad = FieldMapping::new(vec![FieldSpec {
            attribute: None,
            value: Some(FieldValue::column("name")),
        }]);

        let result = RecordBuilder::new().build(&[], &bad, || MockRecord::new(0, &[]), None);

        assert!(matches!(result, Err(ImportError::ConfigError(_))));
    }
}
