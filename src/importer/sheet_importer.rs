// ==========================================
// 表格导入 - 导入入口
// ==========================================
// 职责: 整合导入流程，从文件到导入会话
// 流程: 路径解析 → 读取 → 丢弃表头 → 构建记录 → ImportSession
// 红线: 任一致命错误在会话产生前返回，不留下部分构建的记录
// ==========================================

use crate::config::{ImportConfigReader, ImporterConfig};
use crate::domain::{CellValue, FieldMapping, FieldSpec, Row};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::UniversalReader;
use crate::importer::importer_trait::TabularReader;
use crate::importer::record_builder::RecordBuilder;
use crate::importer::session::ImportSession;
use crate::record::ActiveRecord;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

/// 解析文件路径为绝对路径
///
/// # 规则
/// - `~` 开头：替换为用户主目录
/// - 相对路径：基于当前工作目录
pub fn resolve_file_path(raw: &Path) -> ImportResult<PathBuf> {
    if raw.as_os_str().is_empty() {
        return Err(ImportError::ConfigError("file_path 为空".to_string()));
    }

    let expanded = match raw.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .ok_or_else(|| ImportError::ConfigError("无法解析用户主目录".to_string()))?
            .join(rest),
        Err(_) => raw.to_path_buf(),
    };

    if expanded.is_absolute() {
        Ok(expanded)
    } else {
        Ok(std::env::current_dir()?.join(expanded))
    }
}

// ==========================================
// SheetImporter
// ==========================================
pub struct SheetImporter<F> {
    file_path: PathBuf,
    mapping: FieldMapping,
    factory: F,
    skip_first_row: bool,
    scenario: Option<String>,
    reader: Box<dyn TabularReader>,
    builder: RecordBuilder,
}

impl<F> SheetImporter<F> {
    /// 创建导入器
    ///
    /// # 参数
    /// - file_path: 源文件路径
    /// - mapping: 字段映射表
    /// - factory: 记录构造函数
    pub fn new(file_path: impl Into<PathBuf>, mapping: FieldMapping, factory: F) -> Self {
        Self {
            file_path: file_path.into(),
            mapping,
            factory,
            skip_first_row: false,
            scenario: None,
            reader: Box::new(UniversalReader::new()),
            builder: RecordBuilder::new(),
        }
    }

    /// 按配置创建导入器（未显式设置的选项取 defaults）
    pub fn from_config(
        config: &ImporterConfig,
        defaults: &dyn ImportConfigReader,
        factory: F,
    ) -> ImportResult<Self> {
        let options = config.resolve_options(defaults)?;

        let mut importer = Self::new(config.file_path.clone(), config.field_mapping(), factory)
            .skip_first_row(options.skip_first_row)
            .reader(UniversalReader::new().skip_blank_rows(options.skip_blank_rows));
        importer.scenario = options.scenario;

        Ok(importer)
    }

    pub fn skip_first_row(mut self, skip: bool) -> Self {
        self.skip_first_row = skip;
        self
    }

    pub fn scenario(mut self, scenario: impl Into<String>) -> Self {
        self.scenario = Some(scenario.into());
        self
    }

    pub fn reader(mut self, reader: impl TabularReader + 'static) -> Self {
        self.reader = Box::new(reader);
        self
    }

    /// 追加派生字段
    pub fn derived<G>(mut self, attribute: impl Into<String>, derive: G) -> Self
    where
        G: Fn(&Row) -> CellValue + Send + Sync + 'static,
    {
        self.mapping = self.mapping.with(FieldSpec::derived(attribute, derive));
        self
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn mapping(&self) -> &FieldMapping {
        &self.mapping
    }

    /// 读取文件并构建导入会话
    ///
    /// # 返回
    /// - Ok(ImportSession): 记录已构建，尚未校验
    /// - Err: 路径/文件/映射/列查找错误
    #[instrument(skip(self), fields(file_path = %self.file_path.display(), batch_id = tracing::field::Empty))]
    pub fn open<R>(&self) -> ImportResult<ImportSession<R>>
    where
        F: Fn() -> R,
        R: ActiveRecord,
    {
        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());
        info!("开始导入");

        if self.mapping.is_empty() {
            return Err(ImportError::ConfigError("fields 为空".to_string()));
        }

        // === 步骤 1: 路径解析 ===
        let path = resolve_file_path(&self.file_path)?;
        if !path.exists() {
            error!(path = %path.display(), "文件不存在");
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        // === 步骤 2: 读取文件 ===
        let mut rows = self.reader.load(&path).map_err(|e| {
            error!(error = %e, "文件读取失败");
            e
        })?;
        info!(total_rows = rows.len(), "文件读取完成");

        // === 步骤 3: 丢弃表头 ===
        if self.skip_first_row && !rows.is_empty() {
            rows.remove(0);
            debug!("已丢弃首行");
        }

        // === 步骤 4: 构建记录 ===
        let records = self.builder.build(
            &rows,
            &self.mapping,
            &self.factory,
            self.scenario.as_deref(),
        )?;
        info!(records = records.len(), "记录构建完成");

        Ok(ImportSession::with_batch_id(batch_id, records))
    }

    /// 构建并保存，返回会话与已落库主键
    pub fn import<R>(&self) -> ImportResult<(ImportSession<R>, Vec<R::Key>)>
    where
        F: Fn() -> R,
        R: ActiveRecord,
    {
        let mut session = self.open()?;
        let keys = session.save();
        Ok((session, keys))
    }
}
