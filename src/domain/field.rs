// ==========================================
// 赛车零件追踪系统 - 自定义字段定义
// ==========================================
// 职责: 管理员定义的零件扩展字段（text / number / dropdown）
// ==========================================

use crate::domain::types::FieldType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomFieldDefinition {
    pub field_id: String,
    /// 内部键（已归一化，全局唯一）
    pub field_name: String,
    pub label: String,
    pub field_type: FieldType,
    /// 仅 dropdown 非空
    pub options: Vec<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl CustomFieldDefinition {
    pub fn allows_option(&self, value: &str) -> bool {
        self.options.iter().any(|o| o == value)
    }
}

/// 按 field_name 建索引
pub fn index_by_name(
    defs: impl IntoIterator<Item = CustomFieldDefinition>,
) -> HashMap<String, CustomFieldDefinition> {
    defs.into_iter()
        .map(|d| (d.field_name.clone(), d))
        .collect()
}

// ==========================================
// 字段软告警
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldWarningReason {
    /// 列无对应字段定义（导入兼容：仍然保存）
    UndefinedField,
    /// number 字段值无法解析为数字（按原文保存）
    NumberCoercionFailed,
    /// dropdown 字段值不在选项内（按原文保存）
    DropdownValueNotInOptions,
}

/// 字段级软告警（不阻断写入）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldWarning {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    pub field: String,
    pub reason: FieldWarningReason,
    pub value: String,
}
