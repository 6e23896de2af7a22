// ==========================================
// 赛车零件追踪系统 - 里程台账引擎
// ==========================================
// 职责: 追加一次测试里程，并把里程累加到车辆全部在用零件
// 红线: miles <= 0 立即失败，不产生任何写入
// 说明: 里程按整车累计（同车所有在用零件同步增加）
// ==========================================

use crate::domain::mileage::MileageLogEntry;
use crate::engine::car_lock::CarLockRegistry;
use crate::engine::error::{WorkflowError, WorkflowResult};
use crate::repository::mileage_repo::MileageRepository;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// 记里程命令
#[derive(Debug, Clone)]
pub struct LogMilesCommand {
    pub car_id: String,
    pub miles: f64,
    /// 缺省为当天（UTC）
    pub test_date: Option<NaiveDate>,
    pub note: Option<String>,
    pub logged_by: String,
}

/// 记里程结果
#[derive(Debug, Clone)]
pub struct MileageLogOutcome {
    pub entry: MileageLogEntry,
    pub updated_part_count: usize,
}

pub struct MileageLedger {
    mileage_repo: Arc<MileageRepository>,
    locks: Arc<CarLockRegistry>,
}

impl MileageLedger {
    pub fn new(mileage_repo: Arc<MileageRepository>, locks: Arc<CarLockRegistry>) -> Self {
        Self {
            mileage_repo,
            locks,
        }
    }

    /// 记录一次测试里程
    ///
    /// # 返回
    /// - Ok(MileageLogOutcome): 新记录与被更新的零件数
    /// - Err(InvalidMiles): miles 非正数或非有限值
    #[instrument(skip(self, command), fields(car_id = %command.car_id, miles = command.miles))]
    pub fn log_miles(&self, command: LogMilesCommand) -> WorkflowResult<MileageLogOutcome> {
        if !command.miles.is_finite() || command.miles <= 0.0 {
            return Err(WorkflowError::InvalidMiles(command.miles));
        }

        let now = Utc::now();
        let entry = MileageLogEntry {
            log_id: Uuid::new_v4().to_string(),
            car_id: command.car_id.clone(),
            miles: command.miles,
            note: command.note.filter(|n| !n.trim().is_empty()),
            test_date: command.test_date.unwrap_or_else(|| now.date_naive()),
            logged_by: command.logged_by,
            logged_at: now,
        };

        let updated_part_count = self
            .locks
            .with_car_lock(&command.car_id, || -> WorkflowResult<usize> {
                Ok(self.mileage_repo.append_and_apply(&entry)?)
            })?;

        info!(
            log_id = %entry.log_id,
            updated_parts = updated_part_count,
            "里程已记录"
        );

        Ok(MileageLogOutcome {
            entry,
            updated_part_count,
        })
    }
}
