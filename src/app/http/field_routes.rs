// ==========================================
// 赛车零件追踪系统 - 自定义字段路由
// ==========================================

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};

use crate::api::field_api::{FieldDeleteResponse, FieldListResponse, FieldResponse};
use crate::api::{ApiError, CreateFieldRequest};
use crate::app::http::run_blocking;
use crate::app::state::AppState;
use crate::domain::user::UserContext;

pub fn create_field_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_fields).post(create_field))
        .route("/:field_id", delete(delete_field))
}

async fn list_fields(
    State(state): State<AppState>,
    _user: UserContext,
) -> Result<Json<FieldListResponse>, ApiError> {
    let api = state.field_api.clone();
    let response = run_blocking(move || api.list_fields()).await?;
    Ok(Json(response))
}

async fn create_field(
    State(state): State<AppState>,
    user: UserContext,
    Json(request): Json<CreateFieldRequest>,
) -> Result<(StatusCode, Json<FieldResponse>), ApiError> {
    let api = state.field_api.clone();
    let response = run_blocking(move || api.create_field(request, &user)).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn delete_field(
    State(state): State<AppState>,
    Path(field_id): Path<String>,
    user: UserContext,
) -> Result<Json<FieldDeleteResponse>, ApiError> {
    let api = state.field_api.clone();
    let response = run_blocking(move || api.delete_field(&field_id, &user)).await?;
    Ok(Json(response))
}
