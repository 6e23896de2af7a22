// ==========================================
// 赛车零件追踪系统 - 失效风险评分引擎
// ==========================================
// 职责: 在用零件当前里程 / 同号平均 MBF → 风险分与标签
// 输入: 在用零件 + MbfStat
// 输出: RiskAssessment（有分数的按分数降序，其后为无数据零件）
// 红线: 无失效数据时 risk_score = None，不以 0 代替
// ==========================================

use crate::domain::part::Part;
use crate::domain::report::{MbfStat, RiskAssessment};
use crate::domain::types::RiskLabel;
use std::cmp::Ordering;
use std::collections::HashMap;

// ==========================================
// RiskScorer - 风险评分引擎
// ==========================================
pub struct RiskScorer {
    // 无状态引擎
}

impl Default for RiskScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl RiskScorer {
    pub fn new() -> Self {
        Self {}
    }

    /// 计算单个零件的风险分
    ///
    /// # 返回
    /// - Some(score): 平均 MBF > 0
    /// - None: 无失效数据或平均值非正
    pub fn score(&self, current_miles: f64, avg_mbf: Option<f64>) -> Option<f64> {
        match avg_mbf {
            Some(avg) if avg > 0.0 => Some(current_miles / avg),
            _ => None,
        }
    }

    /// 评估全部在用零件
    ///
    /// # 参数
    /// - `active_parts`: 在用零件（非在用会被忽略）
    /// - `stats`: MBF 统计
    pub fn assess(&self, active_parts: &[Part], stats: &[MbfStat]) -> Vec<RiskAssessment> {
        let by_number: HashMap<&str, &MbfStat> =
            stats.iter().map(|s| (s.part_number.as_str(), s)).collect();

        let mut assessments: Vec<RiskAssessment> = active_parts
            .iter()
            .filter(|p| p.active)
            .map(|part| {
                let stat = by_number.get(part.part_number.as_str());
                let avg_mbf = stat.map(|s| s.avg_miles_between_failures);
                let risk_score = self.score(part.miles_used, avg_mbf);

                RiskAssessment {
                    part_id: part.part_id.clone(),
                    part_number: part.part_number.clone(),
                    part_name: part.part_name.clone(),
                    part_group: part.part_group,
                    part_location: part.part_location,
                    current_miles: part.miles_used,
                    avg_mbf,
                    risk_score,
                    risk_label: RiskLabel::from_score(risk_score),
                    failure_history_count: stat.map(|s| s.failure_count).unwrap_or(0),
                }
            })
            .collect();

        assessments.sort_by(compare_assessments);
        assessments
    }
}

/// 有分数在前（降序），无分数在后；同分按 part_number
fn compare_assessments(a: &RiskAssessment, b: &RiskAssessment) -> Ordering {
    let by_score = match (a.risk_score, b.risk_score) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_score.then_with(|| a.part_number.cmp(&b.part_number))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::ReplacementReason;
    use crate::engine::mbf::tests::{active_part, record};
    use crate::engine::mbf::MbfAggregator;

    #[test]
    fn test_score_equal_to_average_is_critical() {
        let records = vec![record("X", 150.0, ReplacementReason::Failure, 1)];
        let active = vec![active_part("X", 150.0)];
        let stats = MbfAggregator::new().aggregate(&records, &active);

        let result = RiskScorer::new().assess(&active, &stats);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].risk_score, Some(1.0));
        assert_eq!(result[0].risk_label, RiskLabel::Critical);
        assert_eq!(result[0].failure_history_count, 1);
    }

    #[test]
    fn test_unscored_parts_follow_scored() {
        let records = vec![
            record("A", 100.0, ReplacementReason::Failure, 1),
            record("B", 100.0, ReplacementReason::Failure, 2),
        ];
        let active = vec![
            active_part("N", 500.0),
            active_part("A", 40.0),
            active_part("B", 90.0),
        ];
        let stats = MbfAggregator::new().aggregate(&records, &active);
        let result = RiskScorer::new().assess(&active, &stats);

        let order: Vec<&str> = result.iter().map(|r| r.part_number.as_str()).collect();
        assert_eq!(order, vec!["B", "A", "N"]);
        assert_eq!(result[0].risk_label, RiskLabel::High);
        assert_eq!(result[1].risk_label, RiskLabel::Low);
        assert_eq!(result[2].risk_score, None);
        assert_eq!(result[2].avg_mbf, None);
        assert_eq!(result[2].risk_label, RiskLabel::Unknown);
    }

    #[test]
    fn test_zero_average_is_unscored() {
        let scorer = RiskScorer::new();
        assert_eq!(scorer.score(10.0, Some(0.0)), None);
        assert_eq!(scorer.score(10.0, None), None);
        assert_eq!(scorer.score(0.0, Some(100.0)), Some(0.0));
    }
}
