// ==========================================
// 赛车零件追踪系统 - 引擎层
// ==========================================
// 写流程: 里程台账 / 零件更换（车辆锁 + 单事务）
// 纯计算: MBF 统计 / 风险评分（无状态，每次请求现算）
// ==========================================

pub mod car_lock;
pub mod error;
pub mod mbf;
pub mod mileage_ledger;
pub mod replacement;
pub mod risk;

pub use car_lock::{CarLockError, CarLockRegistry};
pub use error::{WorkflowError, WorkflowResult};
pub use mbf::MbfAggregator;
pub use mileage_ledger::{LogMilesCommand, MileageLedger, MileageLogOutcome};
pub use replacement::{ReplacePartCommand, ReplacementOutcome, ReplacementWorkflow};
pub use risk::RiskScorer;
