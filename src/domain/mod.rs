// ==========================================
// 赛车零件追踪系统 - 领域层
// ==========================================
// 职责: 实体与值类型，不含存储与流程逻辑
// ==========================================

pub mod field;
pub mod history;
pub mod import;
pub mod mileage;
pub mod part;
pub mod report;
pub mod types;
pub mod user;

pub use field::{CustomFieldDefinition, FieldWarning, FieldWarningReason};
pub use history::{HistoryQuery, ReplacementRecord};
pub use import::{ImportSummary, ImportedRow, RowError, RowErrorReason, RowSkip, SkipReason};
pub use mileage::{MileageLogEntry, MileageLogQuery};
pub use part::{ExtraFields, ExtraValue, Part, PartDraft, PartUpdate};
pub use report::{FailureEvent, MbfStat, RiskAssessment};
pub use user::UserContext;
