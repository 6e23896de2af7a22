// ==========================================
// 赛车零件追踪系统 - 应用层
// ==========================================
// 职责: 状态组装 + HTTP 接入
// ==========================================

pub mod http;
pub mod state;

// 重导出
pub use http::create_router;
pub use state::AppState;
