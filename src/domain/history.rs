// ==========================================
// 赛车零件追踪系统 - 更换记录领域模型
// ==========================================
// 职责: 零件退役时的快照（MBF 统计的数据源）
// 红线: 记录只追加，不可修改
// ==========================================

use crate::domain::part::{ExtraFields, Part};
use crate::domain::types::{PartGroup, PartLocation, ReplacementReason};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplacementRecord {
    pub history_id: String,
    pub car_id: String,
    pub part_id: String,
    pub part_number: String,
    pub part_name: String,
    pub part_group: PartGroup,
    pub part_location: PartLocation,
    pub miles_at_retirement: f64,
    pub reason: ReplacementReason,
    pub note: Option<String>,
    pub replaced_by: String,
    pub replaced_at: DateTime<Utc>,
    pub extra_fields: ExtraFields,
    /// 同规格接替零件（若有）
    pub new_part_id: Option<String>,
}

impl ReplacementRecord {
    /// 以零件当前状态生成退役快照
    pub fn snapshot(
        part: &Part,
        reason: ReplacementReason,
        note: Option<String>,
        replaced_by: &str,
        replaced_at: DateTime<Utc>,
    ) -> Self {
        Self {
            history_id: Uuid::new_v4().to_string(),
            car_id: part.car_id.clone(),
            part_id: part.part_id.clone(),
            part_number: part.part_number.clone(),
            part_name: part.part_name.clone(),
            part_group: part.part_group,
            part_location: part.part_location,
            miles_at_retirement: part.miles_used,
            reason,
            note,
            replaced_by: replaced_by.to_string(),
            replaced_at,
            extra_fields: part.extra_fields.clone(),
            new_part_id: None,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.reason == ReplacementReason::Failure
    }
}

/// 更换历史查询条件
#[derive(Debug, Clone, Default)]
pub struct HistoryQuery {
    pub part_number: Option<String>,
    pub reason: Option<ReplacementReason>,
    pub limit: usize,
}
