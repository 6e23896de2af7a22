// ==========================================
// 赛车零件追踪系统 - 零件更换流程
// ==========================================
// 职责: 退役零件 → 写更换记录 → （可选）生成零里程接替零件
// 红线: 三步原子执行，任一步失败整体回滚
// ==========================================

use crate::domain::history::ReplacementRecord;
use crate::domain::part::Part;
use crate::domain::types::ReplacementReason;
use crate::engine::car_lock::CarLockRegistry;
use crate::engine::error::{WorkflowError, WorkflowResult};
use crate::repository::error::RepositoryError;
use crate::repository::history_repo::HistoryRepository;
use crate::repository::part_repo::PartRepository;
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, instrument};

/// 更换命令
#[derive(Debug, Clone)]
pub struct ReplacePartCommand {
    pub car_id: String,
    pub part_id: String,
    /// 原始原因文本，流程内校验
    pub reason: String,
    pub note: Option<String>,
    pub replace_with_same: bool,
    pub replaced_by: String,
}

/// 更换结果
#[derive(Debug, Clone)]
pub struct ReplacementOutcome {
    pub history: ReplacementRecord,
    pub new_part: Option<Part>,
}

pub struct ReplacementWorkflow {
    part_repo: Arc<PartRepository>,
    history_repo: Arc<HistoryRepository>,
    locks: Arc<CarLockRegistry>,
}

impl ReplacementWorkflow {
    pub fn new(
        part_repo: Arc<PartRepository>,
        history_repo: Arc<HistoryRepository>,
        locks: Arc<CarLockRegistry>,
    ) -> Self {
        Self {
            part_repo,
            history_repo,
            locks,
        }
    }

    /// 更换零件
    ///
    /// # 错误
    /// - InvalidReason: 原因不在枚举内
    /// - PartNotFound / PartNotOnCar / PartAlreadyRetired: 前置条件不满足
    /// - Repository: 存储失败（已回滚）
    #[instrument(skip(self, command), fields(car_id = %command.car_id, part_id = %command.part_id))]
    pub fn replace_part(&self, command: ReplacePartCommand) -> WorkflowResult<ReplacementOutcome> {
        let reason = ReplacementReason::parse(&command.reason)
            .ok_or_else(|| WorkflowError::InvalidReason(command.reason.clone()))?;

        self.locks.with_car_lock(&command.car_id, || -> WorkflowResult<ReplacementOutcome> {
            let part = self
                .part_repo
                .find_by_id(&command.part_id)?
                .ok_or_else(|| WorkflowError::PartNotFound(command.part_id.clone()))?;

            if part.car_id != command.car_id {
                return Err(WorkflowError::PartNotOnCar {
                    part_id: part.part_id,
                    car_id: command.car_id.clone(),
                });
            }
            if !part.active {
                return Err(WorkflowError::PartAlreadyRetired(part.part_id));
            }

            let now = Utc::now();
            let note = command.note.clone().filter(|n| !n.trim().is_empty());
            let mut history =
                ReplacementRecord::snapshot(&part, reason, note, &command.replaced_by, now);

            let new_part = if command.replace_with_same {
                let next = part.successor(&history.history_id, &command.replaced_by, now);
                history.new_part_id = Some(next.part_id.clone());
                Some(next)
            } else {
                None
            };

            match self.history_repo.record_replacement(&history, new_part.as_ref()) {
                Ok(()) => {}
                Err(RepositoryError::BusinessRuleViolation(msg)) => {
                    // 并发路径绕过车辆锁时的兜底
                    error!(reason = %msg, "零件在写入前已被退役");
                    return Err(WorkflowError::PartAlreadyRetired(part.part_id));
                }
                Err(e) => {
                    error!(error = %e, "更换事务失败，已回滚");
                    return Err(e.into());
                }
            }

            info!(
                history_id = %history.history_id,
                reason = %reason,
                miles_at_retirement = history.miles_at_retirement,
                new_part_id = ?history.new_part_id,
                "零件已更换"
            );

            Ok(ReplacementOutcome { history, new_part })
        })
    }
}
