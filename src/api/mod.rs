// ==========================================
// 赛车零件追踪系统 - API 层
// ==========================================
// 职责: 业务 API 接口，供 HTTP 路由调用
// 说明: 同步接口；调用方负责放到阻塞线程池执行
// ==========================================

pub mod access;
pub mod error;
pub mod field_api;
pub mod import_api;
pub mod mileage_api;
pub mod part_api;
pub mod replacement_api;
pub mod report_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use field_api::{CreateFieldRequest, FieldApi};
pub use import_api::{ImportApi, ImportApiResponse, UploadRequest};
pub use mileage_api::{LogMilesRequest, MileageApi, MilesLogParams};
pub use part_api::{CreatePartRequest, PartApi, PartListParams, UpdatePartRequest};
pub use replacement_api::{HistoryParams, ReplacePartRequest, ReplacementApi};
pub use report_api::{HighMilesParams, LikelyToFailParams, ReportApi};
