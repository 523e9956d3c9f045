// ==========================================
// 表格导入 - SQLite 表记录
// ==========================================
// 职责: 按表结构保存一行属性（rusqlite）
// 规则: save() 先按当前场景校验，通过后 INSERT（已有主键则 UPDATE）
// 红线: 数据库错误不向上抛出，记录日志后 save() 返回 false
// ==========================================

use crate::domain::{AttributeMap, CellValue};
use crate::record::error::{RecordError, RecordResult};
use crate::record::rules::{RuleSet, DEFAULT_SCENARIO};
use crate::record::{ActiveRecord, FirstErrors};
use chrono::Utc;
use rusqlite::{Connection, ToSql};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

static EMPTY_CELL: CellValue = CellValue::Empty;

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

// ==========================================
// TableSchema - 目标表结构
// ==========================================
#[derive(Debug, Clone)]
pub struct TableSchema {
    table: String,
    columns: Vec<String>,
    rules: RuleSet,
    timestamps: bool,
}

impl TableSchema {
    /// 创建表结构
    ///
    /// # 校验
    /// - 表名、列名非空
    /// - 列名不重复，且不使用保留列 id / created_at / updated_at
    pub fn new(table: &str, columns: &[&str]) -> RecordResult<Self> {
        if table.trim().is_empty() {
            return Err(RecordError::SchemaError("表名为空".to_string()));
        }

        let mut seen = HashSet::new();
        for column in columns {
            if column.trim().is_empty() {
                return Err(RecordError::SchemaError(format!("表 {} 存在空列名", table)));
            }
            if matches!(*column, "id" | "created_at" | "updated_at") {
                return Err(RecordError::SchemaError(format!("列名 {} 为保留列", column)));
            }
            if !seen.insert(*column) {
                return Err(RecordError::SchemaError(format!("列名 {} 重复", column)));
            }
        }

        Ok(Self {
            table: table.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rules: RuleSet::new(),
            timestamps: false,
        })
    }

    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    /// 启用 created_at / updated_at 审计列
    pub fn with_timestamps(mut self) -> Self {
        self.timestamps = true;
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// 建表（已存在则跳过）
    pub fn create_table(&self, conn: &Connection) -> RecordResult<()> {
        let mut defs = vec!["id INTEGER PRIMARY KEY AUTOINCREMENT".to_string()];
        defs.extend(self.columns.iter().map(|c| quote_ident(c)));
        if self.timestamps {
            defs.push("created_at TEXT".to_string());
            defs.push("updated_at TEXT".to_string());
        }

        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            quote_ident(&self.table),
            defs.join(", ")
        );
        conn.execute_batch(&sql)?;
        Ok(())
    }

    fn insert_sql(&self) -> String {
        let mut names: Vec<String> = self.columns.iter().map(|c| quote_ident(c)).collect();
        if self.timestamps {
            names.push("created_at".to_string());
        }
        let placeholders: Vec<String> = (1..=names.len()).map(|i| format!("?{}", i)).collect();

        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(&self.table),
            names.join(", "),
            placeholders.join(", ")
        )
    }

    fn update_sql(&self) -> String {
        let mut sets: Vec<String> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{} = ?{}", quote_ident(c), i + 1))
            .collect();
        if self.timestamps {
            sets.push(format!("updated_at = ?{}", sets.len() + 1));
        }

        format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            quote_ident(&self.table),
            sets.join(", "),
            sets.len() + 1
        )
    }
}

// ==========================================
// TableRecord - 一行对应的表记录
// ==========================================
pub struct TableRecord {
    conn: Arc<Mutex<Connection>>,
    schema: Arc<TableSchema>,
    scenario: String,
    attributes: AttributeMap,
    errors: FirstErrors,
    id: Option<i64>,
}

impl TableRecord {
    pub fn new(conn: Arc<Mutex<Connection>>, schema: Arc<TableSchema>) -> Self {
        Self {
            conn,
            schema,
            scenario: DEFAULT_SCENARIO.to_string(),
            attributes: AttributeMap::new(),
            errors: FirstErrors::new(),
            id: None,
        }
    }

    pub fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    pub fn get(&self, attribute: &str) -> Option<&CellValue> {
        self.attributes.get(attribute)
    }

    pub fn scenario(&self) -> &str {
        &self.scenario
    }

    pub fn is_new_record(&self) -> bool {
        self.id.is_none()
    }

    /// 写库，返回主键
    fn persist(&self) -> RecordResult<i64> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RecordError::LockError(e.to_string()))?;

        let now = Utc::now().to_rfc3339();
        let mut params: Vec<&dyn ToSql> = self
            .schema
            .columns
            .iter()
            .map(|c| self.attributes.get(c).unwrap_or(&EMPTY_CELL) as &dyn ToSql)
            .collect();
        if self.schema.timestamps {
            params.push(&now);
        }

        match self.id {
            Some(id) => {
                params.push(&id);
                conn.execute(&self.schema.update_sql(), params.as_slice())?;
                Ok(id)
            }
            None => {
                conn.execute(&self.schema.insert_sql(), params.as_slice())?;
                Ok(conn.last_insert_rowid())
            }
        }
    }
}

impl ActiveRecord for TableRecord {
    type Key = i64;

    fn set_scenario(&mut self, scenario: &str) {
        self.scenario = scenario.to_string();
    }

    /// 只接收表结构中声明的列
    fn set_attributes(&mut self, attributes: AttributeMap) {
        for (name, value) in attributes {
            if self.schema.columns.contains(&name) {
                self.attributes.insert(name, value);
            } else {
                debug!(table = %self.schema.table, attribute = %name, "忽略未声明的属性");
            }
        }
    }

    fn validate(&mut self) -> bool {
        self.errors = self.schema.rules.validate(&self.scenario, &self.attributes);
        self.errors.is_empty()
    }

    fn first_errors(&self) -> FirstErrors {
        self.errors.clone()
    }

    fn save(&mut self) -> bool {
        if !self.validate() {
            return false;
        }

        match self.persist() {
            Ok(id) => {
                self.id = Some(id);
                true
            }
            Err(e) => {
                warn!(table = %self.schema.table, error = %e, "记录保存失败");
                false
            }
        }
    }

    fn primary_key(&self) -> Option<i64> {
        self.id
    }
}

// ==========================================
// TableRecordFactory - 记录工厂
// ==========================================
// 所有记录共享同一连接与表结构
#[derive(Clone)]
pub struct TableRecordFactory {
    conn: Arc<Mutex<Connection>>,
    schema: Arc<TableSchema>,
}

impl TableRecordFactory {
    /// 创建工厂并确保目标表存在
    pub fn new(conn: Arc<Mutex<Connection>>, schema: TableSchema) -> RecordResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RecordError::LockError(e.to_string()))?;
            schema.create_table(&guard)?;
        }

        Ok(Self {
            conn,
            schema: Arc::new(schema),
        })
    }

    pub fn create(&self) -> TableRecord {
        TableRecord::new(Arc::clone(&self.conn), Arc::clone(&self.schema))
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// 目标表当前行数
    pub fn count(&self) -> RecordResult<i64> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RecordError::LockError(e.to_string()))?;
        let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(&self.schema.table));
        Ok(conn.query_row(&sql, [], |row| row.get(0))?)
    }
}
