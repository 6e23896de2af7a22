// ==========================================
// 赛车零件追踪系统 - HTTP 接入层
// ==========================================
// 职责: axum 路由组装；业务 API 为同步调用，统一放到阻塞线程池
// ==========================================

pub mod car_routes;
pub mod error;
pub mod extract;
pub mod field_routes;
pub mod report_routes;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::api::{ApiError, ApiResult};
use crate::app::state::AppState;

pub use error::ErrorResponse;
pub use extract::{USER_EMAIL_HEADER, USER_ROLE_HEADER};

/// 组装完整路由
pub fn create_router(state: AppState) -> Router {
    let cars = car_routes::create_car_router().merge(report_routes::create_report_router());

    Router::new()
        .route("/health", get(health))
        .nest("/cars", cars)
        .nest("/part-fields", field_routes::create_field_router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": crate::VERSION,
    }))
}

/// 在阻塞线程池执行同步业务调用
pub(crate) async fn run_blocking<T, F>(f: F) -> ApiResult<T>
where
    F: FnOnce() -> ApiResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::InternalError(format!("阻塞任务执行失败: {}", e)))?
}
