// ==========================================
// 赛车零件追踪系统 - 车辆维度路由
// ==========================================
// /cars/:car_id/...
//   upload / miles / parts / parts/:part_id[/replace] / history
// ==========================================

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use crate::api::import_api::ImportApiResponse;
use crate::api::mileage_api::{LogMilesResponse, MilesLogResponse};
use crate::api::part_api::{
    PartDeleteResponse, PartListResponse, PartResponse, PartWriteResponse,
};
use crate::api::replacement_api::{HistoryResponse, ReplacePartResponse};
use crate::api::{
    ApiError, CreatePartRequest, HistoryParams, LogMilesRequest, MilesLogParams,
    PartListParams, ReplacePartRequest, UpdatePartRequest, UploadRequest,
};
use crate::app::http::run_blocking;
use crate::app::state::AppState;
use crate::domain::user::UserContext;

pub fn create_car_router() -> Router<AppState> {
    Router::new()
        .route("/:car_id/upload", post(upload_spreadsheet))
        .route("/:car_id/miles", get(list_miles).post(log_miles))
        .route("/:car_id/parts", get(list_parts).post(create_part))
        .route(
            "/:car_id/parts/:part_id",
            get(get_part).put(update_part).delete(delete_part),
        )
        .route("/:car_id/parts/:part_id/replace", post(replace_part))
        .route("/:car_id/history", get(list_history))
}

// ==========================================
// 导入
// ==========================================

async fn upload_spreadsheet(
    State(state): State<AppState>,
    Path(car_id): Path<String>,
    user: UserContext,
    Json(request): Json<UploadRequest>,
) -> Result<Json<ImportApiResponse>, ApiError> {
    let api = state.import_api.clone();
    let response =
        run_blocking(move || api.upload_spreadsheet(&car_id, request, &user)).await?;
    Ok(Json(response))
}

// ==========================================
// 里程
// ==========================================

async fn log_miles(
    State(state): State<AppState>,
    Path(car_id): Path<String>,
    user: UserContext,
    Json(request): Json<LogMilesRequest>,
) -> Result<(StatusCode, Json<LogMilesResponse>), ApiError> {
    let api = state.mileage_api.clone();
    let response = run_blocking(move || api.log_miles(&car_id, request, &user)).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn list_miles(
    State(state): State<AppState>,
    Path(car_id): Path<String>,
    _user: UserContext,
    Query(params): Query<MilesLogParams>,
) -> Result<Json<MilesLogResponse>, ApiError> {
    let api = state.mileage_api.clone();
    let response = run_blocking(move || api.list_miles(&car_id, params)).await?;
    Ok(Json(response))
}

// ==========================================
// 零件
// ==========================================

async fn list_parts(
    State(state): State<AppState>,
    Path(car_id): Path<String>,
    _user: UserContext,
    Query(params): Query<PartListParams>,
) -> Result<Json<PartListResponse>, ApiError> {
    let api = state.part_api.clone();
    let response = run_blocking(move || api.list_parts(&car_id, params)).await?;
    Ok(Json(response))
}

async fn create_part(
    State(state): State<AppState>,
    Path(car_id): Path<String>,
    user: UserContext,
    Json(request): Json<CreatePartRequest>,
) -> Result<(StatusCode, Json<PartWriteResponse>), ApiError> {
    let api = state.part_api.clone();
    let response = run_blocking(move || api.create_part(&car_id, request, &user)).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn get_part(
    State(state): State<AppState>,
    Path((car_id, part_id)): Path<(String, String)>,
    _user: UserContext,
) -> Result<Json<PartResponse>, ApiError> {
    let api = state.part_api.clone();
    let response = run_blocking(move || api.get_part(&car_id, &part_id)).await?;
    Ok(Json(response))
}

async fn update_part(
    State(state): State<AppState>,
    Path((car_id, part_id)): Path<(String, String)>,
    user: UserContext,
    Json(request): Json<UpdatePartRequest>,
) -> Result<Json<PartWriteResponse>, ApiError> {
    let api = state.part_api.clone();
    let response =
        run_blocking(move || api.update_part(&car_id, &part_id, request, &user)).await?;
    Ok(Json(response))
}

async fn delete_part(
    State(state): State<AppState>,
    Path((car_id, part_id)): Path<(String, String)>,
    user: UserContext,
) -> Result<Json<PartDeleteResponse>, ApiError> {
    let api = state.part_api.clone();
    let response = run_blocking(move || api.delete_part(&car_id, &part_id, &user)).await?;
    Ok(Json(response))
}

// ==========================================
// 更换 / 历史
// ==========================================

async fn replace_part(
    State(state): State<AppState>,
    Path((car_id, part_id)): Path<(String, String)>,
    user: UserContext,
    Json(request): Json<ReplacePartRequest>,
) -> Result<Json<ReplacePartResponse>, ApiError> {
    let api = state.replacement_api.clone();
    let response =
        run_blocking(move || api.replace_part(&car_id, &part_id, request, &user)).await?;
    Ok(Json(response))
}

async fn list_history(
    State(state): State<AppState>,
    Path(car_id): Path<String>,
    _user: UserContext,
    Query(params): Query<HistoryParams>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let api = state.replacement_api.clone();
    let response = run_blocking(move || api.list_history(&car_id, params)).await?;
    Ok(Json(response))
}
