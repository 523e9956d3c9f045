// ==========================================
// 表格导入 - 导入接口 Trait
// ==========================================
// 职责: 定义外部表格读取接口（不包含实现）
// 红线: 读取器只负责把文件变成有序行序列，不解释行内容
// ==========================================

use crate::domain::Row;
use crate::importer::error::ImportResult;
use std::path::Path;

// ==========================================
// TabularReader Trait
// ==========================================
// 用途: 文件解析接口
// 实现者: CsvReader, ExcelReader, UniversalReader
pub trait TabularReader: Send + Sync {
    /// 读取文件为有序行序列
    ///
    /// # 参数
    /// - file_path: 文件路径（已解析为绝对路径）
    ///
    /// # 返回
    /// - Ok(Vec<Row>): 行序列，下标即行号
    /// - Err: 文件不存在、格式不支持、解析失败
    fn load(&self, file_path: &Path) -> ImportResult<Vec<Row>>;
}
