// ==========================================
// 赛车零件追踪系统 - 调用方身份提取
// ==========================================
// 身份由上游认证层写入请求头:
//   x-user-email: 邮箱
//   x-user-role:  admin | readonly
// 缺失或非法 → 401
// ==========================================

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::api::error::ApiError;
use crate::domain::types::UserRole;
use crate::domain::user::UserContext;

pub const USER_EMAIL_HEADER: &str = "x-user-email";
pub const USER_ROLE_HEADER: &str = "x-user-role";

fn header_value<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

#[async_trait]
impl<S> FromRequestParts<S> for UserContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let email = header_value(parts, USER_EMAIL_HEADER)
            .ok_or_else(|| ApiError::Unauthorized("缺少调用方身份".to_string()))?;
        let role_raw = header_value(parts, USER_ROLE_HEADER)
            .ok_or_else(|| ApiError::Unauthorized("缺少调用方角色".to_string()))?;
        let role = UserRole::parse(role_raw)
            .ok_or_else(|| ApiError::Unauthorized(format!("未知角色: {}", role_raw)))?;

        Ok(UserContext::new(email, role))
    }
}
