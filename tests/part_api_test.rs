// ==========================================
// 零件 / 字段 / 里程 / 历史 API 测试
// ==========================================


use parts_tracker::api::{
    ApiError, CreateFieldRequest, HistoryParams, LogMilesRequest, MilesLogParams,
    PartListParams, ReplacePartRequest, UpdatePartRequest,
};
use parts_tracker::domain::field::FieldWarningReason;
use parts_tracker::domain::part::ExtraFields;
use parts_tracker::domain::types::{FieldType, ReplacementReason};
use parts_tracker::domain::ExtraValue;
use parts_tracker::logging;
use test_helpers::{
    admin, create_field, part_request, readonly, setup_state, CAR_ID, OTHER_CAR_ID,
};

fn extra(pairs: &[(&str, ExtraValue)]) -> ExtraFields {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

// ==========================================
// 零件
// ==========================================

#[test]
fn test_dropdown_value_round_trips_as_identical_string() {
    logging::init_test();
    let (_temp_file, state) = setup_state();
    create_field(&state, "wrench_size", "dropdown", &["10mm", "12mm"]);

    let mut request = part_request("SH-001", "Front Shock");
    request.extra_fields = extra(&[("wrench_size", ExtraValue::Text("10mm".to_string()))]);
    let created = state.part_api.create_part(CAR_ID, request, &admin()).unwrap();
    assert!(created.warnings.is_empty());

    let fetched = state.part_api.get_part(CAR_ID, &created.part_id).unwrap();
    assert_eq!(
        fetched.part.part.extra_fields.get("wrench_size"),
        Some(&ExtraValue::Text("10mm".to_string()))
    );
    let json = serde_json::to_value(&fetched).unwrap();
    assert_eq!(json["part"]["extra_fields"]["wrench_size"], "10mm");
    assert!(json["part"].get("orphaned_fields").is_none());
}

#[test]
fn test_extra_field_validation_on_write() {
    logging::init_test();
    let (_temp_file, state) = setup_state();
    create_field(&state, "wrench_size", "dropdown", &["10mm"]);
    create_field(&state, "torque_nm", "number", &[]);

    let mut unknown = part_request("SH-001", "Shock");
    unknown.extra_fields = extra(&[("colour", ExtraValue::Text("red".to_string()))]);
    assert!(matches!(
        state.part_api.create_part(CAR_ID, unknown, &admin()),
        Err(ApiError::InvalidInput(_))
    ));

    let mut bad_number = part_request("SH-001", "Shock");
    bad_number.extra_fields = extra(&[("torque_nm", ExtraValue::Text("tight".to_string()))]);
    assert!(matches!(
        state.part_api.create_part(CAR_ID, bad_number, &admin()),
        Err(ApiError::InvalidInput(_))
    ));

    let mut soft = part_request("SH-001", "Shock");
    soft.extra_fields = extra(&[
        ("wrench_size", ExtraValue::Text("13mm".to_string())),
        ("torque_nm", ExtraValue::Text("45".to_string())),
    ]);
    let created = state.part_api.create_part(CAR_ID, soft, &admin()).unwrap();
    assert_eq!(created.warnings.len(), 1);
    assert_eq!(
        created.warnings[0].reason,
        FieldWarningReason::DropdownValueNotInOptions
    );
    assert_eq!(
        created.part.extra_fields.get("torque_nm"),
        Some(&ExtraValue::Number(45.0))
    );
}

#[test]
fn test_deleted_field_is_flagged_as_orphaned() {
    logging::init_test();
    let (_temp_file, state) = setup_state();
    let field = create_field(&state, "designer", "text", &[]);

    let mut request = part_request("SH-001", "Shock");
    request.extra_fields = extra(&[("designer", ExtraValue::Text("Alice".to_string()))]);
    let created = state.part_api.create_part(CAR_ID, request, &admin()).unwrap();

    state.field_api.delete_field(&field.field_id, &admin()).unwrap();

    let fetched = state.part_api.get_part(CAR_ID, &created.part_id).unwrap();
    assert_eq!(fetched.part.orphaned_fields, vec!["designer".to_string()]);
    assert_eq!(
        fetched.part.part.extra_fields.get("designer"),
        Some(&ExtraValue::Text("Alice".to_string()))
    );

    let listed = state
        .part_api
        .list_parts(CAR_ID, PartListParams::default())
        .unwrap();
    assert_eq!(listed.parts[0].orphaned_fields, vec!["designer".to_string()]);
}

#[test]
fn test_active_part_number_is_unique_per_car() {
    logging::init_test();
    let (_temp_file, state) = setup_state();

    state
        .part_api
        .create_part(CAR_ID, part_request("SH-001", "Shock"), &admin())
        .unwrap();
    assert!(matches!(
        state
            .part_api
            .create_part(CAR_ID, part_request("SH-001", "Shock 2"), &admin()),
        Err(ApiError::Conflict(_))
    ));
    // 其他车辆可用同号
    state
        .part_api
        .create_part(OTHER_CAR_ID, part_request("SH-001", "Shock"), &admin())
        .unwrap();

    let other = state
        .part_api
        .create_part(CAR_ID, part_request("BR-002", "Caliper"), &admin())
        .unwrap();
    assert!(matches!(
        state.part_api.update_part(
            CAR_ID,
            &other.part_id,
            UpdatePartRequest {
                part_number: Some("SH-001".to_string()),
                ..Default::default()
            },
            &admin(),
        ),
        Err(ApiError::Conflict(_))
    ));
}

#[test]
fn test_update_merges_and_lowers_miles() {
    logging::init_test();
    let (_temp_file, state) = setup_state();
    create_field(&state, "designer", "text", &[]);
    create_field(&state, "torque_nm", "number", &[]);

    let mut request = part_request("SH-001", "Shock");
    request.miles_used = Some(300.0);
    request.extra_fields = extra(&[("designer", ExtraValue::Text("Alice".to_string()))]);
    let created = state.part_api.create_part(CAR_ID, request, &admin()).unwrap();

    let updated = state
        .part_api
        .update_part(
            CAR_ID,
            &created.part_id,
            UpdatePartRequest {
                part_name: Some("Rear Shock".to_string()),
                part_location: Some("rear left".to_string()),
                miles_used: Some(12.0),
                extra_fields: Some(extra(&[("torque_nm", ExtraValue::Number(40.0))])),
                ..Default::default()
            },
            &admin(),
        )
        .unwrap();

    assert_eq!(updated.message, "Part updated");
    assert_eq!(updated.part.part_name, "Rear Shock");
    assert_eq!(updated.part.miles_used, 12.0);
    assert_eq!(updated.part.extra_fields.len(), 2);

    let cleared = state
        .part_api
        .update_part(
            CAR_ID,
            &created.part_id,
            UpdatePartRequest {
                extra_fields: Some(extra(&[("designer", ExtraValue::Text(String::new()))])),
                ..Default::default()
            },
            &admin(),
        )
        .unwrap();
    assert!(!cleared.part.extra_fields.contains_key("designer"));

    assert!(matches!(
        state.part_api.update_part(
            CAR_ID,
            &created.part_id,
            UpdatePartRequest::default(),
            &admin()
        ),
        Err(ApiError::InvalidInput(_))
    ));
    assert!(matches!(
        state.part_api.update_part(
            CAR_ID,
            &created.part_id,
            UpdatePartRequest {
                miles_used: Some(-1.0),
                ..Default::default()
            },
            &admin()
        ),
        Err(ApiError::InvalidInput(_))
    ));
}

#[test]
fn test_access_rules() {
    logging::init_test();
    let (_temp_file, state) = setup_state();
    let created = state
        .part_api
        .create_part(CAR_ID, part_request("SH-001", "Shock"), &admin())
        .unwrap();

    assert!(matches!(
        state
            .part_api
            .create_part(CAR_ID, part_request("BR-002", "Caliper"), &readonly()),
        Err(ApiError::Forbidden(_))
    ));
    assert!(matches!(
        state
            .part_api
            .delete_part(CAR_ID, &created.part_id, &readonly()),
        Err(ApiError::Forbidden(_))
    ));
    assert!(matches!(
        state.part_api.get_part(OTHER_CAR_ID, &created.part_id),
        Err(ApiError::Forbidden(_))
    ));
    assert!(matches!(
        state.part_api.get_part(CAR_ID, "nope"),
        Err(ApiError::NotFound(_))
    ));

    // 只读用户可以读
    assert_eq!(
        state
            .part_api
            .list_parts(CAR_ID, PartListParams::default())
            .unwrap()
            .count,
        1
    );

    let deleted = state
        .part_api
        .delete_part(CAR_ID, &created.part_id, &admin())
        .unwrap();
    assert_eq!(deleted.message, "Part deleted");
    assert!(matches!(
        state.part_api.get_part(CAR_ID, &created.part_id),
        Err(ApiError::NotFound(_))
    ));
}

#[test]
fn test_list_parts_filters_and_sorts_by_name() {
    logging::init_test();
    let (_temp_file, state) = setup_state();

    let mut brake = part_request("BR-002", "caliper");
    brake.part_group = "brakes".to_string();
    brake.part_location = "rear_right".to_string();
    state.part_api.create_part(CAR_ID, brake, &admin()).unwrap();
    state
        .part_api
        .create_part(CAR_ID, part_request("SH-001", "Anti-roll bar"), &admin())
        .unwrap();
    state
        .part_api
        .create_part(CAR_ID, part_request("SH-002", "Damper"), &admin())
        .unwrap();

    let all = state
        .part_api
        .list_parts(CAR_ID, PartListParams::default())
        .unwrap();
    let names: Vec<&str> = all.parts.iter().map(|p| p.part.part_name.as_str()).collect();
    assert_eq!(names, vec!["Anti-roll bar", "caliper", "Damper"]);

    let brakes = state
        .part_api
        .list_parts(
            CAR_ID,
            PartListParams {
                group: Some("brakes".to_string()),
                location: None,
            },
        )
        .unwrap();
    assert_eq!(brakes.count, 1);

    assert!(state
        .part_api
        .list_parts(
            CAR_ID,
            PartListParams {
                group: None,
                location: Some("roof".to_string()),
            },
        )
        .is_err());
}

// ==========================================
// 字段
// ==========================================

#[test]
fn test_field_definition_rules() {
    logging::init_test();
    let (_temp_file, state) = setup_state();

    let field = create_field(&state, "Wrench Size", "dropdown", &["10mm"]);
    assert_eq!(field.field_name, "wrench_size");
    assert_eq!(field.field_type, FieldType::Dropdown);
    assert_eq!(field.created_by, "crew.chief@team.io");

    let request = |name: &str, field_type: &str, options: &[&str]| CreateFieldRequest {
        field_name: name.to_string(),
        label: "Label".to_string(),
        field_type: Some(field_type.to_string()),
        options: options.iter().map(|o| o.to_string()).collect(),
    };

    assert!(matches!(
        state
            .field_api
            .create_field(request("wrench_size", "text", &[]), &admin()),
        Err(ApiError::Conflict(_))
    ));
    assert!(matches!(
        state
            .field_api
            .create_field(request("Part Number", "text", &[]), &admin()),
        Err(ApiError::InvalidInput(_))
    ));
    assert!(matches!(
        state
            .field_api
            .create_field(request("thread", "dropdown", &[]), &admin()),
        Err(ApiError::InvalidInput(_))
    ));
    assert!(matches!(
        state
            .field_api
            .create_field(request("thread", "colour", &[]), &admin()),
        Err(ApiError::InvalidInput(_))
    ));
    assert!(matches!(
        state
            .field_api
            .create_field(request("thread", "text", &[]), &readonly()),
        Err(ApiError::Forbidden(_))
    ));

    assert_eq!(state.field_api.list_fields().unwrap().fields.len(), 1);
    assert!(matches!(
        state.field_api.delete_field("missing", &admin()),
        Err(ApiError::NotFound(_))
    ));
}

// ==========================================
// 里程 / 历史
// ==========================================

#[test]
fn test_mileage_api_log_and_list() {
    logging::init_test();
    let (_temp_file, state) = setup_state();
    state
        .part_api
        .create_part(CAR_ID, part_request("SH-001", "Shock"), &admin())
        .unwrap();

    let logged = state
        .mileage_api
        .log_miles(
            CAR_ID,
            LogMilesRequest {
                miles: Some(12.25),
                note: Some("practice".to_string()),
                test_date: Some("2026-04-01".to_string()),
            },
            &admin(),
        )
        .unwrap();
    assert_eq!(logged.updated_part_count, 1);
    assert_eq!(logged.message, "Logged 12.25 miles for 1 active parts");

    state
        .mileage_api
        .log_miles(
            CAR_ID,
            LogMilesRequest {
                miles: Some(30.0),
                note: None,
                test_date: Some("2026-04-03".to_string()),
            },
            &admin(),
        )
        .unwrap();

    let all = state
        .mileage_api
        .list_miles(CAR_ID, MilesLogParams::default())
        .unwrap();
    assert_eq!(all.count, 2);
    assert_eq!(all.total_miles_shown, 42.25);
    assert_eq!(all.log[0].miles, 30.0);

    let ranged = state
        .mileage_api
        .list_miles(
            CAR_ID,
            MilesLogParams {
                limit: None,
                from_date: Some("2026-04-02".to_string()),
                to_date: Some("2026-04-30".to_string()),
            },
        )
        .unwrap();
    assert_eq!(ranged.count, 1);

    assert!(matches!(
        state.mileage_api.log_miles(
            CAR_ID,
            LogMilesRequest {
                miles: Some(0.0),
                note: None,
                test_date: None,
            },
            &admin(),
        ),
        Err(ApiError::InvalidMiles(_))
    ));
    assert!(matches!(
        state.mileage_api.log_miles(
            CAR_ID,
            LogMilesRequest {
                miles: None,
                note: Some("forgot the number".to_string()),
                test_date: None,
            },
            &admin(),
        ),
        Err(ApiError::InvalidInput(_))
    ));
    assert_eq!(
        state
            .mileage_api
            .list_miles(CAR_ID, MilesLogParams::default())
            .unwrap()
            .count,
        2
    );
    assert!(matches!(
        state.mileage_api.log_miles(
            CAR_ID,
            LogMilesRequest {
                miles: Some(5.0),
                note: None,
                test_date: None,
            },
            &readonly(),
        ),
        Err(ApiError::Forbidden(_))
    ));
}

#[test]
fn test_history_listing_filters() {
    logging::init_test();
    let (_temp_file, state) = setup_state();

    for (number, reason) in [("SH-001", "failure"), ("BR-002", "upgrade"), ("SH-003", "failure")] {
        let part = state
            .part_api
            .create_part(CAR_ID, part_request(number, "Part"), &admin())
            .unwrap();
        state
            .replacement_api
            .replace_part(
                CAR_ID,
                &part.part_id,
                ReplacePartRequest {
                    reason: reason.to_string(),
                    note: None,
                    replace_with_same: false,
                },
                &admin(),
            )
            .unwrap();
    }

    let all = state
        .replacement_api
        .list_history(CAR_ID, HistoryParams::default())
        .unwrap();
    assert_eq!(all.count, 3);
    assert!(all
        .history
        .windows(2)
        .all(|w| w[0].replaced_at >= w[1].replaced_at));

    let failures = state
        .replacement_api
        .list_history(
            CAR_ID,
            HistoryParams {
                reason: Some("failure".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(failures.count, 2);
    assert!(failures
        .history
        .iter()
        .all(|h| h.reason == ReplacementReason::Failure));

    let by_number = state
        .replacement_api
        .list_history(
            CAR_ID,
            HistoryParams {
                part_number: Some("BR-002".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(by_number.count, 1);

    let limited = state
        .replacement_api
        .list_history(
            CAR_ID,
            HistoryParams {
                limit: Some(1),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(limited.count, 1);

    assert!(state
        .replacement_api
        .list_history(
            CAR_ID,
            HistoryParams {
                reason: Some("crash".to_string()),
                ..Default::default()
            },
        )
        .is_err());
}

#[test]
fn test_retired_part_cannot_be_edited_or_replaced_again() {
    logging::init_test();
    let (_temp_file, state) = setup_state();
    let part = state
        .part_api
        .create_part(CAR_ID, part_request("SH-001", "Shock"), &admin())
        .unwrap();

    let replace = || ReplacePartRequest {
        reason: "failure".to_string(),
        note: None,
        replace_with_same: true,
    };
    let first = state
        .replacement_api
        .replace_part(CAR_ID, &part.part_id, replace(), &admin())
        .unwrap();
    assert_eq!(first.message, "Part replaced successfully");

    assert!(matches!(
        state
            .replacement_api
            .replace_part(CAR_ID, &part.part_id, replace(), &admin()),
        Err(ApiError::BusinessRuleViolation(_))
    ));
    assert!(matches!(
        state.part_api.update_part(
            CAR_ID,
            &part.part_id,
            UpdatePartRequest {
                part_name: Some("x".to_string()),
                ..Default::default()
            },
            &admin()
        ),
        Err(ApiError::BusinessRuleViolation(_))
    ));
}
