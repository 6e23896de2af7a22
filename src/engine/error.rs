// ==========================================
// 赛车零件追踪系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use crate::engine::car_lock::CarLockError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 记里程 / 更换流程 的错误
#[derive(Error, Debug)]
pub enum WorkflowError {
    // ===== 前置条件 =====
    #[error("里程必须为正数: {0}")]
    InvalidMiles(f64),

    #[error("无效的更换原因: {0}（可选: failure/upgrade/routine_maintenance/other）")]
    InvalidReason(String),

    #[error("零件不存在: {0}")]
    PartNotFound(String),

    #[error("零件不属于该车辆: part_id={part_id}, car_id={car_id}")]
    PartNotOnCar { part_id: String, car_id: String },

    #[error("零件已退役: {0}")]
    PartAlreadyRetired(String),

    // ===== 完整性 =====
    #[error(transparent)]
    Lock(#[from] CarLockError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;
