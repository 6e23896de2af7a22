// ==========================================
// 赛车零件追踪系统 - 可靠性报表模型
// ==========================================
// 职责: MBF 统计 / 风险评估 的领域输出
// 说明: 领域值保持精确，展示层负责取整
// ==========================================

use crate::domain::types::{PartGroup, PartLocation, RiskLabel};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 单次失效事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureEvent {
    pub miles_at_failure: f64,
    pub replaced_at: DateTime<Utc>,
    pub note: Option<String>,
}

/// 按 part_number 汇总的失效统计（Miles Between Failures）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MbfStat {
    pub part_number: String,
    /// 最早一次失效时的零件名
    pub part_name: String,
    pub failure_count: usize,
    pub avg_miles_between_failures: f64,
    pub min_miles_at_failure: f64,
    pub max_miles_at_failure: f64,
    /// 同号在用零件的里程（按在用零件列表顺序），无在用零件时为空
    pub current_active_miles: Vec<f64>,
    pub highest_active_pct_of_avg_mbf: Option<i64>,
    /// 按时间升序
    pub failures: Vec<FailureEvent>,
}

/// 单个在用零件的风险评估
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub part_id: String,
    pub part_number: String,
    pub part_name: String,
    pub part_group: PartGroup,
    pub part_location: PartLocation,
    pub current_miles: f64,
    pub avg_mbf: Option<f64>,
    /// 无失效数据时为 None（而不是 0）
    pub risk_score: Option<f64>,
    pub risk_label: RiskLabel,
    pub failure_history_count: usize,
}

impl RiskAssessment {
    pub fn is_scored(&self) -> bool {
        self.risk_score.is_some()
    }
}

/// 四舍五入到指定小数位
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.66666, 3), 0.667);
        assert_eq!(round_to(150.04, 1), 150.0);
        assert_eq!(round_to(12.345, 2), 12.35);
    }
}
