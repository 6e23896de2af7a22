// ==========================================
// 赛车零件追踪系统 - 零件领域模型
// ==========================================
// 职责: Part 实体、导入/新建草稿、部分更新
// 红线: 同车同 part_number 的在用零件唯一
// ==========================================

use crate::domain::types::{PartGroup, PartLocation};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

// ==========================================
// ExtraValue - 自定义字段值
// ==========================================
/// 自定义字段值：字符串或数字
///
/// untagged 反序列化先尝试数字，因此 `"10mm"` 保持字符串原样。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtraValue {
    Number(f64),
    Text(String),
}

impl ExtraValue {
    /// 数值视图（字符串不做隐式转换）
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ExtraValue::Number(n) => Some(*n),
            ExtraValue::Text(_) => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, ExtraValue::Text(s) if s.trim().is_empty())
    }
}

impl fmt::Display for ExtraValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtraValue::Number(n) => write!(f, "{}", n),
            ExtraValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// 自定义字段表（按字段名有序，便于稳定序列化）
pub type ExtraFields = BTreeMap<String, ExtraValue>;

// ==========================================
// Part - 零件
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub part_id: String,
    pub car_id: String,
    pub part_number: String,
    pub part_name: String,
    pub part_group: PartGroup,
    pub part_location: PartLocation,
    pub miles_used: f64,
    pub active: bool,
    pub purchased_from: Option<String>,
    pub cost: Option<String>,
    pub extra_fields: ExtraFields,
    /// 由更换流程生成时，指向被替换零件的历史记录
    pub replaced_from_history_id: Option<String>,
    pub retired_at: Option<DateTime<Utc>>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Part {
    /// 以同规格生成零里程的接替零件
    pub fn successor(
        &self,
        history_id: &str,
        created_by: &str,
        now: DateTime<Utc>,
    ) -> Part {
        Part {
            part_id: Uuid::new_v4().to_string(),
            car_id: self.car_id.clone(),
            part_number: self.part_number.clone(),
            part_name: self.part_name.clone(),
            part_group: self.part_group,
            part_location: self.part_location,
            miles_used: 0.0,
            active: true,
            purchased_from: self.purchased_from.clone(),
            cost: self.cost.clone(),
            extra_fields: self.extra_fields.clone(),
            replaced_from_history_id: Some(history_id.to_string()),
            retired_at: None,
            created_by: created_by.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

// ==========================================
// PartDraft - 校验通过、尚未落库的零件
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct PartDraft {
    pub part_number: String,
    pub part_name: String,
    pub part_group: PartGroup,
    pub part_location: PartLocation,
    pub miles_used: f64,
    pub purchased_from: Option<String>,
    pub cost: Option<String>,
    pub extra_fields: ExtraFields,
}

impl PartDraft {
    /// 生成在用零件
    ///
    /// # 参数
    /// - car_id: 所属车辆
    /// - created_by: 操作人
    /// - now: 创建时间
    pub fn into_part(self, car_id: &str, created_by: &str, now: DateTime<Utc>) -> Part {
        Part {
            part_id: Uuid::new_v4().to_string(),
            car_id: car_id.to_string(),
            part_number: self.part_number,
            part_name: self.part_name,
            part_group: self.part_group,
            part_location: self.part_location,
            miles_used: self.miles_used,
            active: true,
            purchased_from: self.purchased_from,
            cost: self.cost,
            extra_fields: self.extra_fields,
            replaced_from_history_id: None,
            retired_at: None,
            created_by: created_by.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

// ==========================================
// PartUpdate - 部分更新
// ==========================================
/// None 表示不修改；extra_fields 按键合并
#[derive(Debug, Clone, Default)]
pub struct PartUpdate {
    pub part_number: Option<String>,
    pub part_name: Option<String>,
    pub part_group: Option<PartGroup>,
    pub part_location: Option<PartLocation>,
    pub miles_used: Option<f64>,
    pub purchased_from: Option<String>,
    pub cost: Option<String>,
    pub extra_fields: Option<ExtraFields>,
}

impl PartUpdate {
    pub fn apply(self, part: &mut Part, now: DateTime<Utc>) {
        if let Some(v) = self.part_number {
            part.part_number = v;
        }
        if let Some(v) = self.part_name {
            part.part_name = v;
        }
        if let Some(v) = self.part_group {
            part.part_group = v;
        }
        if let Some(v) = self.part_location {
            part.part_location = v;
        }
        if let Some(v) = self.miles_used {
            part.miles_used = v;
        }
        if let Some(v) = self.purchased_from {
            part.purchased_from = Some(v);
        }
        if let Some(v) = self.cost {
            part.cost = Some(v);
        }
        if let Some(extra) = self.extra_fields {
            part.extra_fields.extend(extra);
        }
        part.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_draft() -> PartDraft {
        PartDraft {
            part_number: "SH-001".to_string(),
            part_name: "Front Shock".to_string(),
            part_group: PartGroup::Suspension,
            part_location: PartLocation::FrontLeft,
            miles_used: 12.5,
            purchased_from: Some("Ohlins".to_string()),
            cost: None,
            extra_fields: ExtraFields::new(),
        }
    }

    #[test]
    fn test_extra_value_text_stays_text() {
        let v: ExtraValue = serde_json::from_str("\"10mm\"").unwrap();
        assert_eq!(v, ExtraValue::Text("10mm".to_string()));
        assert_eq!(serde_json::to_string(&v).unwrap(), "\"10mm\"");

        let n: ExtraValue = serde_json::from_str("42").unwrap();
        assert_eq!(n, ExtraValue::Number(42.0));
    }

    #[test]
    fn test_successor_resets_miles() {
        let part = sample_draft().into_part("car-1", "a@x.io", Utc::now());
        let next = part.successor("hist-1", "b@x.io", Utc::now());

        assert_ne!(next.part_id, part.part_id);
        assert_eq!(next.part_number, part.part_number);
        assert_eq!(next.miles_used, 0.0);
        assert!(next.active);
        assert_eq!(next.replaced_from_history_id.as_deref(), Some("hist-1"));
        assert_eq!(next.purchased_from, part.purchased_from);
    }

    #[test]
    fn test_update_merges_extra_fields() {
        let mut part = sample_draft().into_part("car-1", "a@x.io", Utc::now());
        part.extra_fields
            .insert("torque".to_string(), ExtraValue::Number(40.0));

        let mut extra = ExtraFields::new();
        extra.insert("spring".to_string(), ExtraValue::Text("soft".to_string()));
        PartUpdate {
            part_name: Some("Shock".to_string()),
            extra_fields: Some(extra),
            ..Default::default()
        }
        .apply(&mut part, Utc::now());

        assert_eq!(part.part_name, "Shock");
        assert_eq!(part.extra_fields.len(), 2);
        assert_eq!(part.miles_used, 12.5);
    }
}
