// ==========================================
// 赛车零件追踪系统 - HTTP 错误响应
// ==========================================
// 职责: ApiError → HTTP 状态码 + JSON 错误体
// 错误体: {error, message, details?, code}
// ==========================================

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::api::error::ApiError;

/// JSON 错误体
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    pub code: String,
}

impl ApiError {
    /// 对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::InvalidInput(_)
            | ApiError::InvalidMiles(_)
            | ApiError::BusinessRuleViolation(_)
            | ApiError::ImportError(_)
            | ApiError::HeaderCollision(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::LockError(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::DatabaseError(_) | ApiError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn title(&self) -> &'static str {
        match self {
            ApiError::Unauthorized(_) => "Unauthorized",
            ApiError::Forbidden(_) => "Forbidden",
            ApiError::InvalidInput(_) | ApiError::InvalidMiles(_) => "Bad Request",
            ApiError::NotFound(_) => "Not Found",
            ApiError::Conflict(_) => "Conflict",
            ApiError::BusinessRuleViolation(_) => "Business Rule Violation",
            ApiError::ImportError(_) => "Import Error",
            ApiError::HeaderCollision(_) => "Header Collision",
            ApiError::DatabaseError(_) => "Database Error",
            ApiError::LockError(_) => "Service Busy",
            ApiError::InternalError(_) => "Internal Server Error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "请求处理失败");
        } else {
            tracing::warn!(code = self.code(), error = %self, "请求被拒绝");
        }

        let message = match &self {
            ApiError::Unauthorized(m)
            | ApiError::Forbidden(m)
            | ApiError::InvalidInput(m)
            | ApiError::InvalidMiles(m)
            | ApiError::NotFound(m)
            | ApiError::Conflict(m)
            | ApiError::BusinessRuleViolation(m)
            | ApiError::ImportError(m)
            | ApiError::HeaderCollision(m)
            | ApiError::LockError(m) => m.clone(),
            // 不向调用方暴露存储细节
            ApiError::DatabaseError(_) | ApiError::InternalError(_) => {
                "An internal error occurred".to_string()
            }
        };

        let body = ErrorResponse {
            error: self.title().to_string(),
            message,
            details: None,
            code: self.code().to_string(),
        };
        (status, Json(body)).into_response()
    }
}
