// ==========================================
// 赛车零件追踪系统 - 可靠性报表 API
// ==========================================
// 职责: 易失效零件 / MBF 统计 / 高里程零件
// 说明: 每次请求从历史记录现算，不缓存；
//       数值在此层按展示精度取整（引擎保留原值）
// ==========================================

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::api::access::require_car_id;
use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::part::Part;
use crate::domain::report::{round_to, MbfStat, RiskAssessment};
use crate::domain::types::PartGroup;
use crate::engine::{MbfAggregator, RiskScorer};
use crate::repository::{HistoryRepository, PartRepository};

/// 易失效报表参数
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LikelyToFailParams {
    /// 是否附带无失效数据的零件（风险标签 UNKNOWN）
    #[serde(default)]
    pub include_unscored: bool,
}

/// 高里程报表参数
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HighMilesParams {
    pub limit: Option<usize>,
    pub group: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LikelyToFailResponse {
    pub report: &'static str,
    pub car_id: String,
    pub parts: Vec<RiskAssessment>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MbfResponse {
    pub report: &'static str,
    pub car_id: String,
    pub data: Vec<MbfStat>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct HighMilesResponse {
    pub report: &'static str,
    pub car_id: String,
    pub parts: Vec<Part>,
    pub count: usize,
}

pub struct ReportApi {
    part_repo: Arc<PartRepository>,
    history_repo: Arc<HistoryRepository>,
    config: Arc<ConfigManager>,
    aggregator: MbfAggregator,
    scorer: RiskScorer,
}

impl ReportApi {
    pub fn new(
        part_repo: Arc<PartRepository>,
        history_repo: Arc<HistoryRepository>,
        config: Arc<ConfigManager>,
    ) -> Self {
        Self {
            part_repo,
            history_repo,
            config,
            aggregator: MbfAggregator::new(),
            scorer: RiskScorer::new(),
        }
    }

    /// 易失效零件报表
    ///
    /// # 返回
    /// 按风险分降序；include_unscored=true 时无数据零件排在最后
    pub fn likely_to_fail(
        &self,
        car_id: &str,
        params: LikelyToFailParams,
    ) -> ApiResult<LikelyToFailResponse> {
        let car_id = require_car_id(car_id)?;
        let failures = self.history_repo.list_failures(car_id)?;
        let active = self.part_repo.list_active(car_id, None, None)?;
        let stats = self.aggregator.aggregate(&failures, &active);

        let parts: Vec<RiskAssessment> = self
            .scorer
            .assess(&active, &stats)
            .into_iter()
            .filter(|a| params.include_unscored || a.is_scored())
            .map(|mut a| {
                a.risk_score = a.risk_score.map(|s| round_to(s, 3));
                a.avg_mbf = a.avg_mbf.map(|m| round_to(m, 1));
                a
            })
            .collect();

        debug!(car_id = car_id, active = active.len(), listed = parts.len(), "易失效报表生成");

        Ok(LikelyToFailResponse {
            report: "likely_to_fail",
            car_id: car_id.to_string(),
            count: parts.len(),
            parts,
        })
    }

    /// MBF 报表
    pub fn mbf(&self, car_id: &str) -> ApiResult<MbfResponse> {
        let car_id = require_car_id(car_id)?;
        let data: Vec<MbfStat> = self
            .compute_mbf(car_id)?
            .into_iter()
            .map(|mut s| {
                s.avg_miles_between_failures = round_to(s.avg_miles_between_failures, 1);
                s.min_miles_at_failure = round_to(s.min_miles_at_failure, 1);
                s.max_miles_at_failure = round_to(s.max_miles_at_failure, 1);
                s
            })
            .collect();

        Ok(MbfResponse {
            report: "miles_between_failures",
            car_id: car_id.to_string(),
            count: data.len(),
            data,
        })
    }

    /// 高里程零件报表（按 miles_used 降序）
    pub fn high_miles(&self, car_id: &str, params: HighMilesParams) -> ApiResult<HighMilesResponse> {
        let car_id = require_car_id(car_id)?;
        let group = match params.group.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(PartGroup::parse(raw).ok_or_else(|| {
                ApiError::InvalidInput(format!("未知的零件分组: {}", raw))
            })?),
        };
        let limit = match params.limit {
            Some(0) => return Err(ApiError::InvalidInput("limit 必须大于0".to_string())),
            Some(n) => n,
            None => self.config.high_miles_default_limit()?,
        };

        let parts = self.part_repo.list_high_miles(car_id, group, limit)?;

        Ok(HighMilesResponse {
            report: "high_miles",
            car_id: car_id.to_string(),
            count: parts.len(),
            parts,
        })
    }

    fn compute_mbf(&self, car_id: &str) -> ApiResult<Vec<MbfStat>> {
        let failures = self.history_repo.list_failures(car_id)?;
        let active = self.part_repo.list_active(car_id, None, None)?;
        Ok(self.aggregator.aggregate(&failures, &active))
    }
}
