// ==========================================
// Excel 读取集成测试
// ==========================================
// 测试目标: calamine 读取 → 原始网格（A1 原点补齐、单元格类型转换）
// 测试数据: tests/fixtures/*.xlsx
// ==========================================


use sheet_import::domain::{CellValue, ColumnKey, FieldMapping, FieldSpec, Row};
use sheet_import::importer::{ExcelReader, ImportError, SheetImporter, TabularReader, UniversalReader};
use std::io::Write;
use std::path::Path;
use tempfile::Builder;
use test_helpers::{create_test_db, person_factory};

// 数据区 B2:D4，D4 为空
const PEOPLE_OFFSET: &str = "tests/fixtures/people_offset.xlsx";
// 工作簿不含任何工作表
const NO_SHEETS: &str = "tests/fixtures/no_sheets.xlsx";

fn cell(row: &Row, idx: usize) -> Option<&CellValue> {
    row.get(&ColumnKey::Index(idx))
}

#[test]
fn test_excel_grid_padded_to_a1() {
    let rows = ExcelReader::new().load(Path::new(PEOPLE_OFFSET)).unwrap();

    // 第 1 行为补齐的空行，其后 3 行数据
    assert_eq!(rows.len(), 4);
    assert!(rows.iter().all(|r| r.len() == 4));
    assert!(rows[0].is_blank());

    // A 列补齐为空
    assert_eq!(cell(&rows[1], 0), Some(&CellValue::Empty));
    assert_eq!(cell(&rows[1], 1), Some(&CellValue::from("name")));
    assert_eq!(cell(&rows[1], 3), Some(&CellValue::from("active")));
}

#[test]
fn test_excel_cell_types() {
    let rows = ExcelReader::new().load(Path::new(PEOPLE_OFFSET)).unwrap();

    assert_eq!(cell(&rows[2], 1), Some(&CellValue::from("Alice")));
    // xlsx 数值统一为浮点
    assert_eq!(cell(&rows[2], 2), Some(&CellValue::Float(30.0)));
    assert_eq!(cell(&rows[2], 2).and_then(CellValue::as_i64), Some(30));
    assert_eq!(cell(&rows[2], 3), Some(&CellValue::Bool(true)));

    assert_eq!(cell(&rows[3], 2), Some(&CellValue::Float(2.5)));
    assert_eq!(cell(&rows[3], 3), Some(&CellValue::Empty));
}

#[test]
fn test_excel_skip_blank_rows() {
    let rows = ExcelReader::new()
        .skip_blank_rows(true)
        .load(Path::new(PEOPLE_OFFSET))
        .unwrap();

    assert_eq!(rows.len(), 3);
    assert_eq!(cell(&rows[0], 1), Some(&CellValue::from("name")));
}

#[test]
fn test_universal_reader_dispatches_excel() {
    let rows = UniversalReader::new().load(Path::new(PEOPLE_OFFSET)).unwrap();

    assert_eq!(rows.len(), 4);
    assert_eq!(cell(&rows[3], 1), Some(&CellValue::from("Bob")));
}

#[test]
fn test_excel_without_worksheet() {
    let result = ExcelReader::new().load(Path::new(NO_SHEETS));

    assert!(matches!(result, Err(ImportError::ExcelParseError(_))));
}

#[test]
fn test_excel_corrupted_file() {
    let mut temp_file = Builder::new().suffix(".xlsx").tempfile().unwrap();
    temp_file.write_all(b"not a zip archive").unwrap();

    let result = ExcelReader::new().load(temp_file.path());

    assert!(matches!(result, Err(ImportError::ExcelParseError(_))));
}

#[test]
fn test_excel_reader_rejects_csv_extension() {
    let temp_file = Builder::new().suffix(".csv").tempfile().unwrap();

    let result = ExcelReader::new().load(temp_file.path());

    assert!(matches!(result, Err(ImportError::UnsupportedFormat(ext)) if ext == "csv"));
}

#[test]
fn test_excel_import_end_to_end() {
    let (_db_file, _db_path, conn) = create_test_db().unwrap();
    let factory = person_factory(conn);

    // 补齐后的列位置与工作表一致：B=1, C=2
    let mapping = FieldMapping::default()
        .with(FieldSpec::column("name", 1usize))
        .with(FieldSpec::column("age", 2usize));
    let importer = SheetImporter::new(PEOPLE_OFFSET, mapping, || factory.create())
        .reader(UniversalReader::new().skip_blank_rows(true))
        .skip_first_row(true);
    let (session, keys) = importer.import().unwrap();

    // Bob 的年龄 2.5 不是整数
    assert_eq!(session.records().len(), 2);
    assert_eq!(keys.len(), 1);
    assert_eq!(session.errors()[&1]["age"], "age 必须为整数");
    assert_eq!(factory.count().unwrap(), 1);
}
