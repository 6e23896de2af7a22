// ==========================================
// 赛车零件追踪系统 - 访问控制
// ==========================================
// readonly: 只读；admin: 写入与字段管理
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::user::UserContext;

/// 写操作权限校验
pub fn require_write(user: &UserContext) -> ApiResult<()> {
    if user.can_write() {
        Ok(())
    } else {
        Err(ApiError::Forbidden(format!(
            "用户 {} 为只读角色，不能执行写操作",
            user.email
        )))
    }
}

/// 管理员权限校验
pub fn require_admin(user: &UserContext) -> ApiResult<()> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(ApiError::Forbidden(format!("用户 {} 不是管理员", user.email)))
    }
}

/// car_id 非空校验
pub fn require_car_id(car_id: &str) -> ApiResult<&str> {
    let trimmed = car_id.trim();
    if trimmed.is_empty() {
        return Err(ApiError::InvalidInput("car_id 不能为空".to_string()));
    }
    Ok(trimmed)
}
