// ==========================================
// SpreadsheetImporter 集成测试
// ==========================================
// 测试目标: 文件解析 → 归一化 → 校验 → 查重 → 落库 全流程
// ==========================================


use parts_tracker::domain::field::FieldWarningReason;
use parts_tracker::domain::import::{RowErrorReason, SkipReason};
use parts_tracker::domain::types::FieldType;
use parts_tracker::domain::{CustomFieldDefinition, ExtraValue};
use parts_tracker::importer::{ImportError, PartImporter, SpreadsheetImporter};
use parts_tracker::logging;
use std::sync::Arc;
use test_helpers::{admin, seed_part, setup_repos, TestRepos, CAR_ID, OTHER_CAR_ID};

fn importer(repos: &TestRepos, max_rows: usize) -> SpreadsheetImporter {
    SpreadsheetImporter::new(
        repos.part_repo.clone(),
        repos.field_repo.clone(),
        repos.locks.clone(),
        max_rows,
    )
}

fn define_field(repos: &TestRepos, name: &str, field_type: FieldType, options: &[&str]) {
    repos
        .field_repo
        .insert(&CustomFieldDefinition {
            field_id: format!("f-{}", name),
            field_name: name.to_string(),
            label: name.to_string(),
            field_type,
            options: options.iter().map(|o| o.to_string()).collect(),
            created_by: "admin@team.io".to_string(),
            created_at: chrono::Utc::now(),
        })
        .expect("Failed to insert field");
}

#[test]
fn test_import_csv_classifies_every_row() {
    logging::init_test();
    let (_temp_file, repos) = setup_repos();
    let importer = importer(&repos, 100);

    let csv = "\
Part Number,Part Name,Part Group,Part Location,Miles Used
SH-001,Front Shock,Suspension,Front Left,120.5
,Nameless,engine,rear_left,
BR-002,,brakes,rear_left,
EN-003,Cam,wings,rear_left,
EN-004,Piston,engine,upside_down,
EN-005,Rod,engine,rear center,-5
EN-006,Crank,ENGINE,center_center,
";
    let summary = importer
        .import_file(CAR_ID, "parts.csv", csv.as_bytes(), &admin())
        .expect("Import should succeed");

    assert_eq!(summary.imported_count, 2);
    assert_eq!(summary.skipped_count, 0);
    assert_eq!(summary.error_count, 5);
    assert_eq!(summary.total_rows(), 7);

    let reasons: Vec<(usize, RowErrorReason)> =
        summary.errors.iter().map(|e| (e.row, e.reason)).collect();
    assert_eq!(
        reasons,
        vec![
            (2, RowErrorReason::MissingRequiredField),
            (3, RowErrorReason::MissingRequiredField),
            (4, RowErrorReason::InvalidGroup),
            (5, RowErrorReason::InvalidLocation),
            (6, RowErrorReason::InvalidMiles),
        ]
    );
    assert_eq!(summary.errors[0].part_number, None);
    assert_eq!(summary.errors[1].part_number.as_deref(), Some("BR-002"));

    let parts = repos.part_repo.list_active(CAR_ID, None, None).unwrap();
    assert_eq!(parts.len(), 2);
    let shock = parts.iter().find(|p| p.part_number == "SH-001").unwrap();
    assert!(shock.active);
    assert_eq!(shock.miles_used, 120.5);
    assert_eq!(shock.created_by, "crew.chief@team.io");
    let crank = parts.iter().find(|p| p.part_number == "EN-006").unwrap();
    assert_eq!(crank.miles_used, 0.0);

    assert_eq!(
        summary.message(),
        "Import complete: 2 imported, 0 skipped, 5 errors"
    );
}

#[test]
fn test_duplicate_part_numbers_are_skipped() {
    logging::init_test();
    let (_temp_file, repos) = setup_repos();
    seed_part(&repos.part_repo, CAR_ID, "SH-001", 10.0);
    // 其他车辆的同号零件不影响本车
    seed_part(&repos.part_repo, OTHER_CAR_ID, "BR-002", 10.0);
    let importer = importer(&repos, 100);

    let csv = "\
part_number,part_name,part_group,part_location
SH-001,Shock,suspension,front_left
BR-002,Caliper,brakes,front_right
BR-002,Caliper again,brakes,front_right
";
    let summary = importer
        .import_file(CAR_ID, "parts.csv", csv.as_bytes(), &admin())
        .unwrap();

    assert_eq!(summary.imported_count, 1);
    assert_eq!(summary.imported[0].row, 2);
    assert_eq!(summary.imported[0].part_number, "BR-002");
    assert_eq!(summary.skipped_count, 2);
    assert!(summary
        .skipped
        .iter()
        .all(|s| s.reason == SkipReason::DuplicatePartNumber));
    assert_eq!(
        summary.skipped.iter().map(|s| s.row).collect::<Vec<_>>(),
        vec![1, 3]
    );

    let calipers: Vec<_> = repos
        .part_repo
        .list_active(CAR_ID, None, None)
        .unwrap()
        .into_iter()
        .filter(|p| p.part_number == "BR-002")
        .collect();
    assert_eq!(calipers.len(), 1);
    assert_eq!(calipers[0].part_name, "Caliper");
}

#[test]
fn test_blank_row_is_skipped() {
    logging::init_test();
    let (_temp_file, repos) = setup_repos();
    let importer = importer(&repos, 100);

    let csv = "\
part_number,part_name,part_group,part_location
SH-001,Shock,suspension,front_left
 , , , 
BR-002,Caliper,brakes,front_right
";
    let summary = importer
        .import_file(CAR_ID, "parts.csv", csv.as_bytes(), &admin())
        .unwrap();

    assert_eq!(summary.imported_count, 2);
    assert_eq!(summary.skipped_count, 1);
    assert_eq!(summary.skipped[0].row, 2);
    assert_eq!(summary.skipped[0].reason, SkipReason::BlankRow);
    assert_eq!(summary.imported[1].row, 3);
}

#[test]
fn test_header_collision_aborts_before_any_row() {
    logging::init_test();
    let (_temp_file, repos) = setup_repos();
    let importer = importer(&repos, 100);

    let csv = "\
Part Number,part_number,part_name,part_group,part_location
SH-001,SH-001,Shock,suspension,front_left
";
    let result = importer.import_file(CAR_ID, "parts.csv", csv.as_bytes(), &admin());

    match result {
        Err(ImportError::HeaderCollision { key, .. }) => assert_eq!(key, "part_number"),
        other => panic!("expected header collision, got {:?}", other),
    }
    assert!(repos
        .part_repo
        .list_active(CAR_ID, None, None)
        .unwrap()
        .is_empty());
}

#[test]
fn test_extra_columns_follow_field_definitions() {
    logging::init_test();
    let (_temp_file, repos) = setup_repos();
    define_field(&repos, "wrench_size", FieldType::Dropdown, &["10mm", "12mm"]);
    define_field(&repos, "torque_nm", FieldType::Number, &[]);
    let importer = importer(&repos, 100);

    let csv = "\
part_number,part_name,part_group,part_location,Wrench Size,Torque NM,Colour,Purchased From
SH-001,Shock,suspension,front_left,10mm,45,red,Ohlins
SH-002,Shock B,suspension,front_right,13mm,tight,,
";
    let summary = importer
        .import_file(CAR_ID, "parts.csv", csv.as_bytes(), &admin())
        .unwrap();
    assert_eq!(summary.imported_count, 2);

    let parts = repos.part_repo.list_active(CAR_ID, None, None).unwrap();
    let first = parts.iter().find(|p| p.part_number == "SH-001").unwrap();
    assert_eq!(
        first.extra_fields.get("wrench_size"),
        Some(&ExtraValue::Text("10mm".to_string()))
    );
    assert_eq!(
        first.extra_fields.get("torque_nm"),
        Some(&ExtraValue::Number(45.0))
    );
    assert_eq!(
        first.extra_fields.get("colour"),
        Some(&ExtraValue::Text("red".to_string()))
    );
    assert_eq!(first.purchased_from.as_deref(), Some("Ohlins"));
    assert!(!first.extra_fields.contains_key("purchased_from"));

    let second = parts.iter().find(|p| p.part_number == "SH-002").unwrap();
    assert!(!second.extra_fields.contains_key("colour"));
    assert_eq!(
        second.extra_fields.get("torque_nm"),
        Some(&ExtraValue::Text("tight".to_string()))
    );

    let warnings: Vec<(Option<usize>, &str, FieldWarningReason)> = summary
        .warnings
        .iter()
        .map(|w| (w.row, w.field.as_str(), w.reason))
        .collect();
    assert!(warnings.contains(&(Some(1), "colour", FieldWarningReason::UndefinedField)));
    assert!(warnings.contains(&(
        Some(2),
        "wrench_size",
        FieldWarningReason::DropdownValueNotInOptions
    )));
    assert!(warnings.contains(&(
        Some(2),
        "torque_nm",
        FieldWarningReason::NumberCoercionFailed
    )));
}

#[test]
fn test_file_level_rejections() {
    logging::init_test();
    let (_temp_file, repos) = setup_repos();

    let unsupported = importer(&repos, 100).import_file(CAR_ID, "parts.txt", b"a,b", &admin());
    assert!(matches!(unsupported, Err(ImportError::UnsupportedFormat(_))));

    let header_only = importer(&repos, 100).import_file(
        CAR_ID,
        "parts.csv",
        b"part_number,part_name,part_group,part_location\n",
        &admin(),
    );
    assert!(matches!(header_only, Err(ImportError::EmptyFile)));

    let csv = "\
part_number,part_name,part_group,part_location
A,a,engine,front_left
B,b,engine,front_left
C,c,engine,front_left
";
    let too_many = importer(&repos, 2).import_file(CAR_ID, "parts.csv", csv.as_bytes(), &admin());
    assert!(matches!(
        too_many,
        Err(ImportError::TooManyRows { rows: 3, max: 2 })
    ));
    assert!(repos
        .part_repo
        .list_active(CAR_ID, None, None)
        .unwrap()
        .is_empty());
}

#[test]
fn test_concurrent_imports_never_duplicate_active_numbers() {
    logging::init_test();
    let (_temp_file, repos) = setup_repos();
    let importer = Arc::new(importer(&repos, 100));

    let csv = "\
part_number,part_name,part_group,part_location
SH-001,Shock,suspension,front_left
BR-002,Caliper,brakes,front_right
";
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let importer = importer.clone();
            std::thread::spawn(move || {
                importer
                    .import_file(CAR_ID, "parts.csv", csv.as_bytes(), &admin())
                    .unwrap()
            })
        })
        .collect();

    let imported: usize = handles
        .into_iter()
        .map(|h| h.join().unwrap().imported_count)
        .sum();
    assert_eq!(imported, 2);
    assert_eq!(
        repos.part_repo.list_active(CAR_ID, None, None).unwrap().len(),
        2
    );
}
