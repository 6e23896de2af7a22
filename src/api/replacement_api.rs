// ==========================================
// 赛车零件追踪系统 - 零件更换 API
// ==========================================
// 职责: 更换零件、查询更换历史
// ==========================================

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::access::{require_car_id, require_write};
use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::history::{HistoryQuery, ReplacementRecord};
use crate::domain::part::Part;
use crate::domain::types::ReplacementReason;
use crate::domain::user::UserContext;
use crate::engine::{ReplacePartCommand, ReplacementWorkflow};
use crate::repository::HistoryRepository;

/// 更换请求体
#[derive(Debug, Clone, Deserialize)]
pub struct ReplacePartRequest {
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub replace_with_same: bool,
}

/// 更换响应
#[derive(Debug, Clone, Serialize)]
pub struct ReplacePartResponse {
    pub message: String,
    pub history: ReplacementRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_part: Option<Part>,
}

/// 历史查询参数
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryParams {
    pub part_number: Option<String>,
    pub reason: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryResponse {
    pub history: Vec<ReplacementRecord>,
    pub count: usize,
}

pub struct ReplacementApi {
    workflow: Arc<ReplacementWorkflow>,
    history_repo: Arc<HistoryRepository>,
    config: Arc<ConfigManager>,
}

impl ReplacementApi {
    pub fn new(
        workflow: Arc<ReplacementWorkflow>,
        history_repo: Arc<HistoryRepository>,
        config: Arc<ConfigManager>,
    ) -> Self {
        Self {
            workflow,
            history_repo,
            config,
        }
    }

    /// 更换零件
    ///
    /// # 参数
    /// - car_id / part_id: 路径参数
    /// - request: 原因、备注、是否同型号接替
    /// - user: 操作人（需写权限）
    pub fn replace_part(
        &self,
        car_id: &str,
        part_id: &str,
        request: ReplacePartRequest,
        user: &UserContext,
    ) -> ApiResult<ReplacePartResponse> {
        require_write(user)?;
        let car_id = require_car_id(car_id)?;

        let outcome = self.workflow.replace_part(ReplacePartCommand {
            car_id: car_id.to_string(),
            part_id: part_id.to_string(),
            reason: request.reason,
            note: request.note,
            replace_with_same: request.replace_with_same,
            replaced_by: user.email.clone(),
        })?;

        Ok(ReplacePartResponse {
            message: "Part replaced successfully".to_string(),
            history: outcome.history,
            new_part: outcome.new_part,
        })
    }

    /// 车辆更换历史（新 → 旧）
    pub fn list_history(&self, car_id: &str, params: HistoryParams) -> ApiResult<HistoryResponse> {
        let car_id = require_car_id(car_id)?;

        let reason = match params.reason.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(ReplacementReason::parse(raw).ok_or_else(|| {
                let valid: Vec<&str> = ReplacementReason::ALL.iter().map(|r| r.as_str()).collect();
                ApiError::InvalidInput(format!("reason must be one of: {}", valid.join(", ")))
            })?),
        };
        let limit = match params.limit {
            Some(0) => return Err(ApiError::InvalidInput("limit 必须大于0".to_string())),
            Some(n) => n,
            None => self.config.history_default_limit()?,
        };

        let history = self.history_repo.list_by_car(
            car_id,
            &HistoryQuery {
                part_number: params
                    .part_number
                    .map(|p| p.trim().to_string())
                    .filter(|p| !p.is_empty()),
                reason,
                limit,
            },
        )?;

        Ok(HistoryResponse {
            count: history.len(),
            history,
        })
    }
}
