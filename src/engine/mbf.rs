// ==========================================
// 赛车零件追踪系统 - MBF 统计引擎
// ==========================================
// 职责: 按 part_number 汇总失效里程（Miles Between Failures）
// 输入: 更换记录（仅 reason = failure 计入） + 在用零件
// 输出: MbfStat 列表（按平均值升序）
// 说明: 每次请求现算，不缓存
// ==========================================

use crate::domain::history::ReplacementRecord;
use crate::domain::part::Part;
use crate::domain::report::{FailureEvent, MbfStat};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

// ==========================================
// MbfAggregator - MBF 统计引擎
// ==========================================
pub struct MbfAggregator {
    // 无状态引擎
}

impl Default for MbfAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl MbfAggregator {
    pub fn new() -> Self {
        Self {}
    }

    /// 汇总失效统计
    ///
    /// # 参数
    /// - `records`: 更换记录（非 failure 的记录会被忽略）
    /// - `active_parts`: 在用零件（用于当前里程与占比）
    ///
    /// # 返回
    /// 按 avg_miles_between_failures 升序的统计，平均值相同按 part_number 排序
    pub fn aggregate(&self, records: &[ReplacementRecord], active_parts: &[Part]) -> Vec<MbfStat> {
        let mut groups: BTreeMap<&str, Vec<&ReplacementRecord>> = BTreeMap::new();
        for record in records.iter().filter(|r| r.is_failure()) {
            groups.entry(record.part_number.as_str()).or_default().push(record);
        }

        let mut active_miles = active_miles_by_number(active_parts);

        let mut stats: Vec<MbfStat> = groups
            .into_iter()
            .map(|(part_number, mut failures)| {
                failures.sort_by(|a, b| a.replaced_at.cmp(&b.replaced_at));

                let count = failures.len();
                let total: f64 = failures.iter().map(|f| f.miles_at_retirement).sum();
                let avg = total / count as f64;
                let min = failures
                    .iter()
                    .map(|f| f.miles_at_retirement)
                    .fold(f64::INFINITY, f64::min);
                let max = failures
                    .iter()
                    .map(|f| f.miles_at_retirement)
                    .fold(f64::NEG_INFINITY, f64::max);

                let current_active_miles = active_miles.remove(part_number).unwrap_or_default();
                let highest = current_active_miles.iter().copied().reduce(f64::max);
                let highest_active_pct_of_avg_mbf = match highest {
                    Some(current) if avg > 0.0 => Some((100.0 * current / avg).round() as i64),
                    _ => None,
                };

                MbfStat {
                    part_number: part_number.to_string(),
                    part_name: failures[0].part_name.clone(),
                    failure_count: count,
                    avg_miles_between_failures: avg,
                    min_miles_at_failure: min,
                    max_miles_at_failure: max,
                    current_active_miles,
                    highest_active_pct_of_avg_mbf,
                    failures: failures
                        .iter()
                        .map(|f| FailureEvent {
                            miles_at_failure: f.miles_at_retirement,
                            replaced_at: f.replaced_at,
                            note: f.note.clone(),
                        })
                        .collect(),
                }
            })
            .collect();

        stats.sort_by(|a, b| {
            a.avg_miles_between_failures
                .partial_cmp(&b.avg_miles_between_failures)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.part_number.cmp(&b.part_number))
        });

        tracing::debug!(groups = stats.len(), "MBF 统计完成");
        stats
    }
}

/// 按 part_number 收集在用零件里程，保持输入顺序
fn active_miles_by_number(active_parts: &[Part]) -> HashMap<&str, Vec<f64>> {
    let mut out: HashMap<&str, Vec<f64>> = HashMap::new();
    for part in active_parts.iter().filter(|p| p.active) {
        out.entry(part.part_number.as_str())
            .or_default()
            .push(part.miles_used);
    }
    out
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::part::{ExtraFields, PartDraft};
    use crate::domain::types::{PartGroup, PartLocation, ReplacementReason};
    use chrono::{Duration, TimeZone, Utc};

    pub(crate) fn active_part(number: &str, miles: f64) -> Part {
        PartDraft {
            part_number: number.to_string(),
            part_name: format!("Part {}", number),
            part_group: PartGroup::Suspension,
            part_location: PartLocation::FrontLeft,
            miles_used: miles,
            purchased_from: None,
            cost: None,
            extra_fields: ExtraFields::new(),
        }
        .into_part("car-1", "a@x.io", Utc::now())
    }

    pub(crate) fn record(
        number: &str,
        miles: f64,
        reason: ReplacementReason,
        day: i64,
    ) -> ReplacementRecord {
        let mut part = active_part(number, miles);
        part.part_name = format!("{} day {}", number, day);
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(day);
        ReplacementRecord::snapshot(&part, reason, None, "a@x.io", at)
    }

    #[test]
    fn test_basic_stats() {
        let records = vec![
            record("X", 200.0, ReplacementReason::Failure, 2),
            record("X", 100.0, ReplacementReason::Failure, 1),
        ];
        let stats = MbfAggregator::new().aggregate(&records, &[]);

        assert_eq!(stats.len(), 1);
        let x = &stats[0];
        assert_eq!(x.failure_count, 2);
        assert_eq!(x.avg_miles_between_failures, 150.0);
        assert_eq!(x.min_miles_at_failure, 100.0);
        assert_eq!(x.max_miles_at_failure, 200.0);
        assert_eq!(x.part_name, "X day 1");
        assert_eq!(x.failures[0].miles_at_failure, 100.0);
        assert!(x.current_active_miles.is_empty());
        assert_eq!(x.highest_active_pct_of_avg_mbf, None);
    }

    #[test]
    fn test_non_failures_ignored() {
        let records = vec![
            record("X", 100.0, ReplacementReason::Failure, 1),
            record("X", 900.0, ReplacementReason::Upgrade, 2),
            record("Y", 50.0, ReplacementReason::RoutineMaintenance, 3),
        ];
        let stats = MbfAggregator::new().aggregate(&records, &[]);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].avg_miles_between_failures, 100.0);
    }

    #[test]
    fn test_sorted_ascending_with_active_pct() {
        let records = vec![
            record("B", 300.0, ReplacementReason::Failure, 1),
            record("A", 100.0, ReplacementReason::Failure, 2),
        ];
        let active = vec![active_part("B", 150.0), active_part("B", 240.0)];
        let stats = MbfAggregator::new().aggregate(&records, &active);

        assert_eq!(stats[0].part_number, "A");
        assert_eq!(stats[1].part_number, "B");
        assert_eq!(stats[1].current_active_miles, vec![150.0, 240.0]);
        assert_eq!(stats[1].highest_active_pct_of_avg_mbf, Some(80));
    }

    #[test]
    fn test_every_active_part_of_a_number_is_listed() {
        let records = vec![record("X", 100.0, ReplacementReason::Failure, 1)];
        let active = vec![
            active_part("X", 40.0),
            active_part("Y", 500.0),
            active_part("X", 90.0),
        ];
        let stats = MbfAggregator::new().aggregate(&records, &active);

        assert_eq!(stats[0].current_active_miles, vec![40.0, 90.0]);
        assert_eq!(stats[0].highest_active_pct_of_avg_mbf, Some(90));

        let json = serde_json::to_value(&stats[0]).unwrap();
        assert_eq!(json["current_active_miles"], serde_json::json!([40.0, 90.0]));
    }

    #[test]
    fn test_zero_average_has_no_pct() {
        let records = vec![record("Z", 0.0, ReplacementReason::Failure, 1)];
        let stats = MbfAggregator::new().aggregate(&records, &[active_part("Z", 10.0)]);
        assert_eq!(stats[0].current_active_miles, vec![10.0]);
        assert_eq!(stats[0].highest_active_pct_of_avg_mbf, None);
    }
}
