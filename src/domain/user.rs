// ==========================================
// 赛车零件追踪系统 - 请求身份上下文
// ==========================================
// 身份由上游认证层给出，这里只承载邮箱与角色
// ==========================================

use crate::domain::types::UserRole;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContext {
    pub email: String,
    pub role: UserRole,
}

impl UserContext {
    pub fn new(email: impl Into<String>, role: UserRole) -> Self {
        Self {
            email: email.into(),
            role,
        }
    }

    pub fn can_write(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}
