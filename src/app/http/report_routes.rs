// ==========================================
// 赛车零件追踪系统 - 报表路由
// ==========================================

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};

use crate::api::report_api::{HighMilesResponse, LikelyToFailResponse, MbfResponse};
use crate::api::{ApiError, HighMilesParams, LikelyToFailParams};
use crate::app::http::run_blocking;
use crate::app::state::AppState;
use crate::domain::user::UserContext;

pub fn create_report_router() -> Router<AppState> {
    Router::new()
        .route("/:car_id/reports/likely-to-fail", get(likely_to_fail))
        .route("/:car_id/reports/mbf", get(miles_between_failures))
        .route("/:car_id/reports/high-miles", get(high_miles))
}

async fn likely_to_fail(
    State(state): State<AppState>,
    Path(car_id): Path<String>,
    _user: UserContext,
    Query(params): Query<LikelyToFailParams>,
) -> Result<Json<LikelyToFailResponse>, ApiError> {
    let api = state.report_api.clone();
    let response = run_blocking(move || api.likely_to_fail(&car_id, params)).await?;
    Ok(Json(response))
}

async fn miles_between_failures(
    State(state): State<AppState>,
    Path(car_id): Path<String>,
    _user: UserContext,
) -> Result<Json<MbfResponse>, ApiError> {
    let api = state.report_api.clone();
    let response = run_blocking(move || api.mbf(&car_id)).await?;
    Ok(Json(response))
}

async fn high_miles(
    State(state): State<AppState>,
    Path(car_id): Path<String>,
    _user: UserContext,
    Query(params): Query<HighMilesParams>,
) -> Result<Json<HighMilesResponse>, ApiError> {
    let api = state.report_api.clone();
    let response = run_blocking(move || api.high_miles(&car_id, params)).await?;
    Ok(Json(response))
}
