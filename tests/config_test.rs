// ==========================================
// 导入配置测试
// ==========================================
// 测试目标: config_kv 默认项 + JSON 导入配置驱动 SheetImporter
// ==========================================


use sheet_import::config::{config_keys, ConfigManager, ImportConfigReader, ImporterConfig};
use sheet_import::domain::{ColumnKey, Row};
use sheet_import::importer::SheetImporter;
use std::io::Write;
use tempfile::Builder;
use test_helpers::{create_test_db, person_factory, write_csv};

#[test]
fn test_config_manager_defaults() {
    let (_db_file, db_path, _conn) = create_test_db().unwrap();
    let config = ConfigManager::new(&db_path).unwrap();

    assert!(!config.get_skip_first_row().unwrap());
    assert!(!config.get_skip_blank_rows().unwrap());
    assert_eq!(config.get_default_scenario().unwrap(), None);
}

#[test]
fn test_config_manager_persists_values() {
    let (_db_file, db_path, _conn) = create_test_db().unwrap();

    {
        let config = ConfigManager::new(&db_path).unwrap();
        config
            .set_config_value(config_keys::IMPORT_SKIP_FIRST_ROW, "true")
            .unwrap();
        config
            .set_config_value(config_keys::IMPORT_DEFAULT_SCENARIO, "import")
            .unwrap();
    }

    // 重新打开同一数据库文件
    let config = ConfigManager::new(&db_path).unwrap();
    assert!(config.get_skip_first_row().unwrap());
    assert_eq!(
        config.get_default_scenario().unwrap(),
        Some("import".to_string())
    );

    let snapshot = config.get_config_snapshot().unwrap();
    assert_eq!(snapshot.len(), 2);
}

#[test]
fn test_json_config_drives_import() {
    let (_db_file, db_path, conn) = create_test_db().unwrap();
    let factory = person_factory(conn);
    let defaults = ConfigManager::new(&db_path).unwrap();
    defaults
        .set_config_value(config_keys::IMPORT_SKIP_FIRST_ROW, "true")
        .unwrap();

    let csv = write_csv(&["name,age,email", "Alice,30,a@example.com", ",20,"]).unwrap();
    let raw = format!(
        r#"{{
            "file_path": {},
            "fields": [
                {{ "attribute": "age", "column": 1 }},
                {{ "attribute": "email", "column": 2 }}
            ]
        }}"#,
        serde_json::to_string(&csv.path()).unwrap()
    );

    let mut config_file = Builder::new().suffix(".json").tempfile().unwrap();
    config_file.write_all(raw.as_bytes()).unwrap();
    let config = ImporterConfig::from_json_file(config_file.path()).unwrap();
    assert_eq!(config.fields[0].column, Some(ColumnKey::Index(1)));

    let importer = SheetImporter::from_config(&config, &defaults, || factory.create())
        .unwrap()
        .derived("name", |row: &Row| {
            row.get(&ColumnKey::Index(0)).cloned().unwrap_or_default()
        });
    let (session, keys) = importer.import().unwrap();

    // 表头按默认配置丢弃
    assert_eq!(session.records().len(), 2);
    assert_eq!(keys.len(), 1);
    assert_eq!(session.errors()[&1]["name"], "name 不能为空");
    assert_eq!(factory.count().unwrap(), 1);
}

#[test]
fn test_invalid_json_config() {
    let result = ImporterConfig::from_json_str("{ \"fields\": 1 }");

    assert!(result.unwrap_err().is_config_error());
}
