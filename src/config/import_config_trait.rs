// ==========================================
// 表格导入 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入默认项的读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::importer::error::ImportResult;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 当单次导入未显式给出选项时，提供默认值
// 实现者: ConfigManager（从 config_kv 表读取）, ImportDefaults（内存常量）
pub trait ImportConfigReader: Send + Sync {
    /// 是否丢弃首行（表头）
    ///
    /// # 默认值
    /// - false
    fn get_skip_first_row(&self) -> ImportResult<bool>;

    /// 是否在读取阶段丢弃全空白行
    ///
    /// # 默认值
    /// - false
    fn get_skip_blank_rows(&self) -> ImportResult<bool>;

    /// 默认校验场景
    ///
    /// # 默认值
    /// - None（不设置场景）
    fn get_default_scenario(&self) -> ImportResult<Option<String>>;
}

// ==========================================
// ImportDefaults - 内存默认值
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportDefaults {
    pub skip_first_row: bool,
    pub skip_blank_rows: bool,
    pub scenario: Option<String>,
}

impl ImportConfigReader for ImportDefaults {
    fn get_skip_first_row(&self) -> ImportResult<bool> {
        Ok(self.skip_first_row)
    }

    fn get_skip_blank_rows(&self) -> ImportResult<bool> {
        Ok(self.skip_blank_rows)
    }

    fn get_default_scenario(&self) -> ImportResult<Option<String>> {
        Ok(self.scenario.clone())
    }
}
