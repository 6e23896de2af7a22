// ==========================================
// 赛车零件追踪系统 - 里程 API
// ==========================================
// 职责: 记录测试里程、查询里程记录
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::access::{require_car_id, require_write};
use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::mileage::{MileageLogEntry, MileageLogQuery};
use crate::domain::report::round_to;
use crate::domain::user::UserContext;
use crate::engine::{LogMilesCommand, MileageLedger};
use crate::repository::MileageRepository;

/// 记里程请求体
#[derive(Debug, Clone, Deserialize)]
pub struct LogMilesRequest {
    /// 缺失时返回 JSON 错误体而非提取器拒绝
    #[serde(default)]
    pub miles: Option<f64>,
    #[serde(default)]
    pub note: Option<String>,
    /// YYYY-MM-DD，缺省为当天
    #[serde(default)]
    pub test_date: Option<String>,
}

/// 记里程响应
#[derive(Debug, Clone, Serialize)]
pub struct LogMilesResponse {
    pub message: String,
    pub log_id: String,
    pub updated_part_count: usize,
    pub log: MileageLogEntry,
}

/// 里程记录查询参数
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MilesLogParams {
    pub limit: Option<usize>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
}

/// 里程记录列表响应
#[derive(Debug, Clone, Serialize)]
pub struct MilesLogResponse {
    pub log: Vec<MileageLogEntry>,
    pub count: usize,
    pub total_miles_shown: f64,
}

pub struct MileageApi {
    ledger: Arc<MileageLedger>,
    mileage_repo: Arc<MileageRepository>,
    config: Arc<ConfigManager>,
}

impl MileageApi {
    pub fn new(
        ledger: Arc<MileageLedger>,
        mileage_repo: Arc<MileageRepository>,
        config: Arc<ConfigManager>,
    ) -> Self {
        Self {
            ledger,
            mileage_repo,
            config,
        }
    }

    /// 记录一次测试里程
    ///
    /// # 返回
    /// - Ok(LogMilesResponse)
    /// - Err(InvalidMiles): miles <= 0 或非有限值（不产生任何写入）
    /// - Err(InvalidInput): 缺少 miles 或日期格式错误
    pub fn log_miles(
        &self,
        car_id: &str,
        request: LogMilesRequest,
        user: &UserContext,
    ) -> ApiResult<LogMilesResponse> {
        require_write(user)?;
        let car_id = require_car_id(car_id)?;
        let miles = request
            .miles
            .ok_or_else(|| ApiError::InvalidInput("miles is required".to_string()))?;
        let test_date = parse_date_param("test_date", request.test_date.as_deref())?;

        let outcome = self.ledger.log_miles(LogMilesCommand {
            car_id: car_id.to_string(),
            miles,
            test_date,
            note: request.note,
            logged_by: user.email.clone(),
        })?;

        Ok(LogMilesResponse {
            message: format!(
                "Logged {} miles for {} active parts",
                outcome.entry.miles, outcome.updated_part_count
            ),
            log_id: outcome.entry.log_id.clone(),
            updated_part_count: outcome.updated_part_count,
            log: outcome.entry,
        })
    }

    /// 查询里程记录
    pub fn list_miles(&self, car_id: &str, params: MilesLogParams) -> ApiResult<MilesLogResponse> {
        let car_id = require_car_id(car_id)?;
        let from_date = parse_date_param("from_date", params.from_date.as_deref())?;
        let to_date = parse_date_param("to_date", params.to_date.as_deref())?;
        if let (Some(from), Some(to)) = (from_date, to_date) {
            if from > to {
                return Err(ApiError::InvalidInput(format!(
                    "from_date({}) 不能晚于 to_date({})",
                    from, to
                )));
            }
        }

        let limit = match params.limit {
            Some(0) => return Err(ApiError::InvalidInput("limit 必须大于0".to_string())),
            Some(n) => n,
            None => self.config.miles_log_default_limit()?,
        };

        let log = self.mileage_repo.list(
            car_id,
            &MileageLogQuery {
                from_date,
                to_date,
                limit,
            },
        )?;
        let total: f64 = log.iter().map(|e| e.miles).sum();

        Ok(MilesLogResponse {
            count: log.len(),
            total_miles_shown: round_to(total, 2),
            log,
        })
    }
}

/// 解析 YYYY-MM-DD 日期参数（空串视为未提供）
pub fn parse_date_param(name: &str, raw: Option<&str>) -> ApiResult<Option<NaiveDate>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d").map(Some).map_err(|_| {
            ApiError::InvalidInput(format!("{} 格式错误（应为 YYYY-MM-DD）: {}", name, s))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_param() {
        assert_eq!(parse_date_param("d", None).unwrap(), None);
        assert_eq!(parse_date_param("d", Some(" ")).unwrap(), None);
        assert_eq!(
            parse_date_param("d", Some("2026-03-14")).unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 14)
        );
        assert!(parse_date_param("d", Some("14/03/2026")).is_err());
    }
}
