// ==========================================
// 赛车零件追踪系统 - 行校验器
// ==========================================
// 职责: 归一化行 → PartDraft 或 带原因的拒绝
// 校验顺序:
//   1. 全空行            → skipped(blank_row)
//   2. part_number/name  → missing_required_field
//   3. part_group        → missing_required_field / invalid_group
//   4. part_location     → missing_required_field / invalid_location
//   5. miles_used        → invalid_miles（空值记 0）
//   6. 其余列            → extra_fields（按字段定义做类型处理，软告警）
// 查重（duplicate_part_number）由 DuplicateGuard 在提交前完成
// ==========================================

use crate::domain::field::{CustomFieldDefinition, FieldWarning, FieldWarningReason};
use crate::domain::import::{RowError, RowErrorReason, RowSkip, SkipReason};
use crate::domain::part::{ExtraFields, ExtraValue, PartDraft};
use crate::domain::types::{FieldType, PartGroup, PartLocation};
use crate::importer::column_normalizer::{
    ColumnNormalizer, NormalizedRow, COST, MILES_USED, PART_GROUP, PART_LOCATION, PART_NAME,
    PART_NUMBER, PURCHASED_FROM,
};
use std::collections::{HashMap, HashSet};

/// 单行校验结果
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Accepted {
        draft: PartDraft,
        warnings: Vec<FieldWarning>,
    },
    Skipped(RowSkip),
    Rejected(RowError),
}

/// 按字段定义处理一个自定义字段文本值（导入兼容模式）
///
/// # 返回
/// (保存的值, 可选软告警原因)
pub fn coerce_extra_value(
    def: Option<&CustomFieldDefinition>,
    raw: &str,
) -> (ExtraValue, Option<FieldWarningReason>) {
    let text = || ExtraValue::Text(raw.to_string());
    match def {
        None => (text(), Some(FieldWarningReason::UndefinedField)),
        Some(d) => match d.field_type {
            FieldType::Text => (text(), None),
            FieldType::Number => match raw.parse::<f64>() {
                Ok(n) if n.is_finite() => (ExtraValue::Number(n), None),
                _ => (text(), Some(FieldWarningReason::NumberCoercionFailed)),
            },
            FieldType::Dropdown => {
                if d.allows_option(raw) {
                    (text(), None)
                } else {
                    (text(), Some(FieldWarningReason::DropdownValueNotInOptions))
                }
            }
        },
    }
}

// ==========================================
// RowValidator - 行校验器
// ==========================================
pub struct RowValidator {
    fields: HashMap<String, CustomFieldDefinition>,
}

impl RowValidator {
    /// # 参数
    /// - fields: 自定义字段定义（field_name → 定义）
    pub fn new(fields: HashMap<String, CustomFieldDefinition>) -> Self {
        Self { fields }
    }

    /// 校验一行
    ///
    /// # 参数
    /// - row_no: 行号（从 1 开始，不含表头）
    /// - row: 归一化后的行
    pub fn validate(&self, row_no: usize, row: &NormalizedRow) -> RowOutcome {
        if row.values().all(|v| v.trim().is_empty()) {
            return RowOutcome::Skipped(RowSkip {
                row: row_no,
                part_number: None,
                reason: SkipReason::BlankRow,
            });
        }

        let cell = |key: &str| row.get(key).map(|v| v.trim()).unwrap_or("");

        let part_number = cell(PART_NUMBER);
        if part_number.is_empty() {
            return RowOutcome::Rejected(missing(row_no, None, PART_NUMBER));
        }
        let number = Some(part_number.to_string());

        let part_name = cell(PART_NAME);
        if part_name.is_empty() {
            return RowOutcome::Rejected(missing(row_no, number, PART_NAME));
        }

        let group_raw = cell(PART_GROUP);
        if group_raw.is_empty() {
            return RowOutcome::Rejected(missing(row_no, number, PART_GROUP));
        }
        let part_group = match PartGroup::parse(group_raw) {
            Some(g) => g,
            None => {
                return RowOutcome::Rejected(RowError {
                    row: row_no,
                    part_number: number,
                    reason: RowErrorReason::InvalidGroup,
                    field: Some(PART_GROUP.to_string()),
                    detail: format!("无法识别的分组: {}", group_raw),
                })
            }
        };

        let location_raw = cell(PART_LOCATION);
        if location_raw.is_empty() {
            return RowOutcome::Rejected(missing(row_no, number, PART_LOCATION));
        }
        let part_location = match PartLocation::parse(location_raw) {
            Some(l) => l,
            None => {
                return RowOutcome::Rejected(RowError {
                    row: row_no,
                    part_number: number,
                    reason: RowErrorReason::InvalidLocation,
                    field: Some(PART_LOCATION.to_string()),
                    detail: format!("无法识别的位置: {}", location_raw),
                })
            }
        };

        let miles_raw = cell(MILES_USED);
        let miles_used = if miles_raw.is_empty() {
            0.0
        } else {
            match miles_raw.parse::<f64>() {
                Ok(m) if m.is_finite() && m >= 0.0 => m,
                _ => {
                    return RowOutcome::Rejected(RowError {
                        row: row_no,
                        part_number: number,
                        reason: RowErrorReason::InvalidMiles,
                        field: Some(MILES_USED.to_string()),
                        detail: format!("里程必须为非负数: {}", miles_raw),
                    })
                }
            }
        };

        let optional = |key: &str| {
            let v = cell(key);
            (!v.is_empty()).then(|| v.to_string())
        };

        let mut extra_fields = ExtraFields::new();
        let mut warnings = Vec::new();
        for (key, value) in row {
            let value = value.trim();
            if ColumnNormalizer::is_standard_field(key) || value.is_empty() {
                continue;
            }
            let (stored, warning) = coerce_extra_value(self.fields.get(key), value);
            if let Some(reason) = warning {
                warnings.push(FieldWarning {
                    row: Some(row_no),
                    field: key.clone(),
                    reason,
                    value: value.to_string(),
                });
            }
            extra_fields.insert(key.clone(), stored);
        }

        RowOutcome::Accepted {
            draft: PartDraft {
                part_number: part_number.to_string(),
                part_name: part_name.to_string(),
                part_group,
                part_location,
                miles_used,
                purchased_from: optional(PURCHASED_FROM),
                cost: optional(COST),
                extra_fields,
            },
            warnings,
        }
    }
}

fn missing(row_no: usize, part_number: Option<String>, field: &str) -> RowError {
    RowError {
        row: row_no,
        part_number,
        reason: RowErrorReason::MissingRequiredField,
        field: Some(field.to_string()),
        detail: format!("必填字段为空: {}", field),
    }
}

// ==========================================
// DuplicateGuard - 同车在用零件号查重
// ==========================================
/// 以车辆现有在用零件号为初值，逐行登记已接受的零件号
pub struct DuplicateGuard {
    taken: HashSet<String>,
}

impl DuplicateGuard {
    pub fn new(existing: impl IntoIterator<Item = String>) -> Self {
        Self {
            taken: existing.into_iter().collect(),
        }
    }

    pub fn is_taken(&self, part_number: &str) -> bool {
        self.taken.contains(part_number)
    }

    /// 登记零件号；已存在时返回 false
    pub fn claim(&mut self, part_number: &str) -> bool {
        self.taken.insert(part_number.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::field::index_by_name;
    use chrono::Utc;

    fn row(pairs: &[(&str, &str)]) -> NormalizedRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn base(extra: &[(&str, &str)]) -> NormalizedRow {
        let mut r = row(&[
            ("part_number", "SH-1"),
            ("part_name", "Shock"),
            ("part_group", "Suspension"),
            ("part_location", "Front Left"),
        ]);
        r.extend(row(extra));
        r
    }

    fn field(name: &str, field_type: FieldType, options: &[&str]) -> CustomFieldDefinition {
        CustomFieldDefinition {
            field_id: format!("f-{}", name),
            field_name: name.to_string(),
            label: name.to_string(),
            field_type,
            options: options.iter().map(|s| s.to_string()).collect(),
            created_by: "admin@x.io".to_string(),
            created_at: Utc::now(),
        }
    }

    fn validator() -> RowValidator {
        RowValidator::new(index_by_name(vec![
            field("bolt_size", FieldType::Dropdown, &["10mm", "12mm"]),
            field("torque", FieldType::Number, &[]),
        ]))
    }

    fn rejected_reason(outcome: RowOutcome) -> RowErrorReason {
        match outcome {
            RowOutcome::Rejected(e) => e.reason,
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_accepts_minimal_row_with_zero_miles() {
        match validator().validate(1, &base(&[])) {
            RowOutcome::Accepted { draft, warnings } => {
                assert_eq!(draft.part_group, PartGroup::Suspension);
                assert_eq!(draft.part_location, PartLocation::FrontLeft);
                assert_eq!(draft.miles_used, 0.0);
                assert!(draft.extra_fields.is_empty());
                assert!(warnings.is_empty());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_blank_row_skipped() {
        let outcome = validator().validate(3, &row(&[("part_number", " "), ("part_name", "")]));
        assert_eq!(
            outcome,
            RowOutcome::Skipped(RowSkip {
                row: 3,
                part_number: None,
                reason: SkipReason::BlankRow
            })
        );
    }

    #[test]
    fn test_missing_required_fields() {
        let v = validator();
        let mut r = base(&[]);
        r.insert("part_name".to_string(), "".to_string());
        match v.validate(2, &r) {
            RowOutcome::Rejected(e) => {
                assert_eq!(e.reason, RowErrorReason::MissingRequiredField);
                assert_eq!(e.part_number.as_deref(), Some("SH-1"));
                assert_eq!(e.field.as_deref(), Some("part_name"));
            }
            other => panic!("unexpected {:?}", other),
        }

        let mut r = base(&[]);
        r.insert("part_number".to_string(), "".to_string());
        assert_eq!(rejected_reason(v.validate(2, &r)), RowErrorReason::MissingRequiredField);

        let mut r = base(&[]);
        r.remove("part_group");
        assert_eq!(rejected_reason(v.validate(2, &r)), RowErrorReason::MissingRequiredField);
    }

    #[test]
    fn test_invalid_enums_and_miles() {
        let v = validator();
        let mut r = base(&[]);
        r.insert("part_group".to_string(), "wheels".to_string());
        assert_eq!(rejected_reason(v.validate(1, &r)), RowErrorReason::InvalidGroup);

        let mut r = base(&[]);
        r.insert("part_location".to_string(), "roof".to_string());
        assert_eq!(rejected_reason(v.validate(1, &r)), RowErrorReason::InvalidLocation);

        for bad in ["-5", "abc", "NaN", "inf"] {
            let r = base(&[("miles_used", bad)]);
            assert_eq!(rejected_reason(v.validate(1, &r)), RowErrorReason::InvalidMiles);
        }
    }

    #[test]
    fn test_extra_fields_typed_and_warned() {
        let r = base(&[
            ("bolt_size", "10mm"),
            ("torque", "45.5"),
            ("color", "red"),
            ("notes", ""),
            ("miles_used", "120"),
            ("cost", "$99"),
        ]);
        match validator().validate(1, &r) {
            RowOutcome::Accepted { draft, warnings } => {
                assert_eq!(draft.miles_used, 120.0);
                assert_eq!(draft.cost.as_deref(), Some("$99"));
                assert_eq!(
                    draft.extra_fields.get("bolt_size"),
                    Some(&ExtraValue::Text("10mm".to_string()))
                );
                assert_eq!(draft.extra_fields.get("torque"), Some(&ExtraValue::Number(45.5)));
                assert_eq!(
                    draft.extra_fields.get("color"),
                    Some(&ExtraValue::Text("red".to_string()))
                );
                assert!(!draft.extra_fields.contains_key("notes"));
                assert_eq!(warnings.len(), 1);
                assert_eq!(warnings[0].reason, FieldWarningReason::UndefinedField);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_soft_warnings_keep_value() {
        let r = base(&[("bolt_size", "14mm"), ("torque", "tight")]);
        match validator().validate(1, &r) {
            RowOutcome::Accepted { draft, warnings } => {
                assert_eq!(
                    draft.extra_fields.get("torque"),
                    Some(&ExtraValue::Text("tight".to_string()))
                );
                let reasons: Vec<FieldWarningReason> = warnings.iter().map(|w| w.reason).collect();
                assert_eq!(
                    reasons,
                    vec![
                        FieldWarningReason::DropdownValueNotInOptions,
                        FieldWarningReason::NumberCoercionFailed
                    ]
                );
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_guard() {
        let mut guard = DuplicateGuard::new(vec!["A".to_string()]);
        assert!(guard.is_taken("A"));
        assert!(guard.claim("B"));
        assert!(!guard.claim("B"));
    }
}
