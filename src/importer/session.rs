// ==========================================
// 表格导入 - 导入会话
// ==========================================
// 职责: 校验 → 保存，按行号归属错误，允许部分成功
// 状态: 未校验 → 已校验 →（已保存）
// 红线: 行级失败只累积不抛出；校验为一次性步骤，save 不会重复校验
// ==========================================

use crate::record::{ActiveRecord, FirstErrors};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

// ==========================================
// ImportOutcome - 会话结果汇总
// ==========================================
// 用途: 对外展示/记录日志，save 结果与错误表合并视图
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportOutcome {
    pub batch_id: String,                      // 批次 ID
    pub total_rows: usize,                     // 记录总数
    pub validated: bool,                       // 是否已校验
    pub saved_rows: Vec<usize>,                // 已落库行号
    pub skipped_rows: Vec<usize>,              // 未落库行号
    pub errors: BTreeMap<usize, FirstErrors>,  // 校验失败明细
}

// ==========================================
// ImportSession
// ==========================================
pub struct ImportSession<R: ActiveRecord> {
    batch_id: String,
    records: BTreeMap<usize, R>,
    errors: BTreeMap<usize, FirstErrors>,
    saved: BTreeMap<usize, R::Key>,
    validated: bool,
}

impl<R: ActiveRecord> ImportSession<R> {
    pub fn new(records: BTreeMap<usize, R>) -> Self {
        Self::with_batch_id(uuid::Uuid::new_v4().to_string(), records)
    }

    pub fn with_batch_id(batch_id: impl Into<String>, records: BTreeMap<usize, R>) -> Self {
        Self {
            batch_id: batch_id.into(),
            records,
            errors: BTreeMap::new(),
            saved: BTreeMap::new(),
            validated: false,
        }
    }

    /// 校验全部记录
    ///
    /// # 返回
    /// - true: 所有行均通过
    /// - false: 至少一行失败（明细见 errors()）
    ///
    /// # 说明
    /// - 每次调用先清空错误表，不跨调用累积
    /// - 仅保留每个属性的第一条错误
    pub fn validate(&mut self) -> bool {
        self.errors.clear();

        for (index, record) in self.records.iter_mut() {
            if !record.validate() {
                let errors = record.first_errors();
                debug!(batch_id = %self.batch_id, row = index, ?errors, "行校验未通过");
                self.errors.insert(*index, errors);
            }
        }
        self.validated = true;

        info!(
            batch_id = %self.batch_id,
            total = self.records.len(),
            failed = self.errors.len(),
            "记录校验完成"
        );

        self.errors.is_empty()
    }

    /// 保存全部记录
    ///
    /// # 返回
    /// - 实际落库行的主键（按行号顺序）
    ///
    /// # 说明
    /// - 未校验时先校验一次，但结果不作为整体闸门
    /// - 单行保存失败直接跳过，需结合 errors() 查看原因
    pub fn save(&mut self) -> Vec<R::Key> {
        if !self.validated {
            self.validate();
        }

        self.saved.clear();
        let mut saved_keys = Vec::new();

        for (index, record) in self.records.iter_mut() {
            if !record.save() {
                debug!(batch_id = %self.batch_id, row = index, "行未保存，跳过");
                continue;
            }
            match record.primary_key() {
                Some(key) => {
                    self.saved.insert(*index, key.clone());
                    saved_keys.push(key);
                }
                None => warn!(batch_id = %self.batch_id, row = index, "保存成功但无主键"),
            }
        }

        info!(
            batch_id = %self.batch_id,
            total = self.records.len(),
            saved = saved_keys.len(),
            "记录保存完成"
        );

        saved_keys
    }

    /// 行号 → 第一条错误表
    pub fn errors(&self) -> &BTreeMap<usize, FirstErrors> {
        &self.errors
    }

    /// 行号 → 记录
    pub fn records(&self) -> &BTreeMap<usize, R> {
        &self.records
    }

    /// 最近一次 save 中落库的行号 → 主键
    pub fn saved(&self) -> &BTreeMap<usize, R::Key> {
        &self.saved
    }

    pub fn is_validated(&self) -> bool {
        self.validated
    }

    pub fn batch_id(&self) -> &str {
        &self.batch_id
    }

    pub fn into_records(self) -> BTreeMap<usize, R> {
        self.records
    }

    pub fn outcome(&self) -> ImportOutcome {
        let saved_rows: Vec<usize> = self.saved.keys().copied().collect();
        let skipped_rows = self
            .records
            .keys()
            .filter(|index| !self.saved.contains_key(index))
            .copied()
            .collect();

        ImportOutcome {
            batch_id: self.batch_id.clone(),
            total_rows: self.records.len(),
            validated: self.validated,
            saved_rows,
            skipped_rows,
            errors: self.errors.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CellValue, FieldMapping, FieldSpec, Row};
    use crate::importer::record_builder::RecordBuilder;
    use crate::record::testing::MockRecord;
    use std::cell::Cell;
    use std::collections::BTreeSet;

    fn mapping() -> FieldMapping {
        FieldMapping::default()
            .with(FieldSpec::column("name", "name"))
            .with(FieldSpec::column("age", "age"))
    }

    fn session_for(rows: &[Row]) -> ImportSession<MockRecord> {
        let seq = Cell::new(0u64);
        let records = RecordBuilder::new()
            .build(
                rows,
                &mapping(),
                || {
                    seq.set(seq.get() + 1);
                    MockRecord::new(seq.get(), &["name"])
                },
                None,
            )
            .unwrap();
        ImportSession::with_batch_id("test-batch", records)
    }

    fn people_rows() -> Vec<Row> {
        vec![
            Row::from_pairs([("name", "A"), ("age", "30")]),
            Row::from_pairs([("name", ""), ("age", "40")]),
        ]
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let mut session = session_for(&people_rows());

        assert_eq!(session.records().len(), 2);
        assert!(!session.validate());

        let mut expected = BTreeMap::new();
        expected.insert(
            1usize,
            FirstErrors::from([("name".to_string(), "name 不能为空".to_string())]),
        );
        assert_eq!(session.errors(), &expected);

        let keys = session.save();
        assert_eq!(keys, vec![1]);
        assert_eq!(session.saved().keys().copied().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn test_validate_all_pass() {
        let rows = vec![Row::from_pairs([("name", "A"), ("age", "30")])];
        let mut session = session_for(&rows);

        assert!(session.validate());
        assert!(session.errors().is_empty());
        assert!(session.is_validated());
    }

    #[test]
    fn test_validate_resets_between_calls() {
        let mut session = session_for(&people_rows());

        session.validate();
        let first = session.errors().clone();
        session.validate();

        assert_eq!(session.errors(), &first);
        assert_eq!(session.errors().len(), 1);
    }

    #[test]
    fn test_save_validates_only_once() {
        let mut session = session_for(&people_rows());

        session.validate();
        session.save();

        // validate 一次 + 每条记录 save 内部各一次
        assert!(session.records().values().all(|r| r.validate_calls == 2));
    }

    #[test]
    fn test_implicit_validate_matches_explicit() {
        let mut implicit = session_for(&people_rows());
        let mut explicit = session_for(&people_rows());

        let implicit_keys = implicit.save();
        explicit.validate();
        let explicit_keys = explicit.save();

        assert_eq!(implicit_keys, explicit_keys);
        assert_eq!(implicit.errors(), explicit.errors());
        assert!(implicit.is_validated());
    }

    #[test]
    fn test_partial_failure_counts() {
        let rows = vec![
            Row::from_pairs([("name", "A"), ("age", "1")]),
            Row::from_pairs([("name", " "), ("age", "2")]),
            Row::from_pairs([("name", "C"), ("age", "3")]),
            Row::from_pairs([("name", CellValue::Empty), ("age", CellValue::Empty)]),
            Row::from_pairs([("name", "E"), ("age", "5")]),
        ];
        let mut session = session_for(&rows);

        let keys = session.save();

        assert_eq!(keys.len(), 3);
        assert_eq!(session.errors().len(), 2);

        let saved: BTreeSet<usize> = session.saved().keys().copied().collect();
        let failed: BTreeSet<usize> = session.errors().keys().copied().collect();
        assert!(saved.is_disjoint(&failed));
        assert_eq!(saved.len() + failed.len(), rows.len());
    }

    #[test]
    fn test_save_rejection_is_skipped_silently() {
        let mut session = session_for(&people_rows());
        let mut records = std::mem::take(&mut session.records);
        records.get_mut(&0).unwrap().reject_save = true;
        let mut session = ImportSession::with_batch_id("test-batch", records);

        let keys = session.save();

        assert!(keys.is_empty());
        // 保存被拒的行不在错误表中，只体现在 skipped_rows
        let outcome = session.outcome();
        assert_eq!(outcome.skipped_rows, vec![0, 1]);
        assert_eq!(outcome.errors.keys().copied().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_row_index_preserved() {
        let mut session = session_for(&people_rows());
        session.save();

        let record = &session.records()[&1];
        assert_eq!(record.attributes.get("age"), Some(&CellValue::from("40")));
        assert!(session.errors().contains_key(&1));
    }

    #[test]
    fn test_outcome_before_save() {
        let session = session_for(&people_rows());

        let outcome = session.outcome();

        assert_eq!(outcome.batch_id, "test-batch");
        assert_eq!(outcome.total_rows, 2);
        assert!(!outcome.validated);
        assert!(outcome.saved_rows.is_empty());
        assert_eq!(outcome.skipped_rows, vec![0, 1]);
    }

    #[test]
    fn test_empty_session() {
        let mut session: ImportSession<MockRecord> = ImportSession::new(BTreeMap::new());

        assert!(session.validate());
        assert!(session.save().is_empty());
        assert!(!session.batch_id().is_empty());
    }
}
