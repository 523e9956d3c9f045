// ==========================================
// 表格导入 - 文件读取器实现
// ==========================================
// 支持: Excel (.xlsx/.xlsm/.xlsb/.xls/.ods) / CSV (.csv)
// 输出: 原始网格，列标识为列位置（A=0），首行不做表头处理
// ==========================================

use crate::domain::{CellValue, ColumnKey, Row};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::TabularReader;
use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use std::fs::File;
use std::path::Path;
use tracing::debug;

const EXCEL_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn ensure_exists(path: &Path) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

// 空白行过滤在读取阶段完成，行号随后按过滤结果重新确定
fn finish_rows(rows: Vec<Row>, skip_blank_rows: bool) -> Vec<Row> {
    if !skip_blank_rows {
        return rows;
    }
    let total = rows.len();
    let kept: Vec<Row> = rows.into_iter().filter(|r| !r.is_blank()).collect();
    debug!(total = total, kept = kept.len(), "已跳过空白行");
    kept
}

// ==========================================
// CSV Reader 实现
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct CsvReader {
    skip_blank_rows: bool,
}

impl CsvReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skip_blank_rows(mut self, skip: bool) -> Self {
        self.skip_blank_rows = skip;
        self
    }
}

impl TabularReader for CsvReader {
    fn load(&self, file_path: &Path) -> ImportResult<Vec<Row>> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        // 表头由调用方决定是否跳过（skip_first_row）
        let file = File::open(file_path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let mut grid: Vec<Vec<CellValue>> = Vec::new();
        for result in reader.records() {
            let record = result?;
            grid.push(record.iter().map(CellValue::from_text).collect());
        }

        // 短行补齐到最宽行，与 Excel 网格一致（缺失单元格为 Empty）
        let width = grid.iter().map(Vec::len).max().unwrap_or(0);
        let rows = grid
            .into_iter()
            .map(|mut cells| {
                cells.resize(width, CellValue::Empty);
                Row::from_cells(cells)
            })
            .collect();

        Ok(finish_rows(rows, self.skip_blank_rows))
    }
}

// ==========================================
// Excel Reader 实现
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ExcelReader {
    skip_blank_rows: bool,
}

impl ExcelReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skip_blank_rows(mut self, skip: bool) -> Self {
        self.skip_blank_rows = skip;
        self
    }
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::String(s) => CellValue::from_text(s),
        other => CellValue::String(other.to_string()),
    }
}

impl TabularReader for ExcelReader {
    fn load(&self, file_path: &Path) -> ImportResult<Vec<Row>> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if !EXCEL_EXTENSIONS.contains(&ext.as_str()) {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut workbook = open_workbook_auto(file_path)?;

        // 读取第一个 sheet
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;
        let range = workbook.worksheet_range(&sheet_name)?;

        // calamine 的 range 从首个非空单元格开始，这里补齐到 A1 原点
        let (row_offset, col_offset) = range
            .start()
            .map(|(r, c)| (r as usize, c as usize))
            .unwrap_or((0, 0));
        let width = col_offset + range.width();

        let mut rows = Vec::with_capacity(row_offset + range.height());
        for _ in 0..row_offset {
            rows.push(Row::from_cells(vec![CellValue::Empty; width]));
        }

        for data_row in range.rows() {
            let mut row = Row::new();
            for col_idx in 0..col_offset {
                row.insert(ColumnKey::Index(col_idx), CellValue::Empty);
            }
            for (col_idx, cell) in data_row.iter().enumerate() {
                row.insert(ColumnKey::Index(col_offset + col_idx), cell_value(cell));
            }
            rows.push(row);
        }

        debug!(sheet = %sheet_name, rows = rows.len(), "工作表读取完成");

        Ok(finish_rows(rows, self.skip_blank_rows))
    }
}

// ==========================================
// 通用文件读取器（根据扩展名自动选择）
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct UniversalReader {
    skip_blank_rows: bool,
}

impl UniversalReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skip_blank_rows(mut self, skip: bool) -> Self {
        self.skip_blank_rows = skip;
        self
    }
}

impl TabularReader for UniversalReader {
    fn load(&self, file_path: &Path) -> ImportResult<Vec<Row>> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        match ext.as_str() {
            "csv" => CsvReader::new()
                .skip_blank_rows(self.skip_blank_rows)
                .load(file_path),
            e if EXCEL_EXTENSIONS.contains(&e) => ExcelReader::new()
                .skip_blank_rows(self.skip_blank_rows)
                .load(file_path),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}
