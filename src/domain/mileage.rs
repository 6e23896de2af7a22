// ==========================================
// 赛车零件追踪系统 - 里程记录领域模型
// ==========================================
// 红线: 记录只追加，不可修改
// ==========================================

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// 一次上车测试的里程记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MileageLogEntry {
    pub log_id: String,
    pub car_id: String,
    pub miles: f64,
    pub note: Option<String>,
    pub test_date: NaiveDate,
    pub logged_by: String,
    pub logged_at: DateTime<Utc>,
}

/// 里程记录查询条件（test_date 闭区间）
#[derive(Debug, Clone, Default)]
pub struct MileageLogQuery {
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub limit: usize,
}
