// ==========================================
// 赛车零件追踪系统 - 自定义字段 API
// ==========================================
// 职责: 管理员维护零件扩展字段定义
// ==========================================

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::api::access::require_admin;
use crate::api::error::{ApiError, ApiResult};
use crate::domain::field::CustomFieldDefinition;
use crate::domain::types::FieldType;
use crate::domain::user::UserContext;
use crate::importer::ColumnNormalizer;
use crate::repository::{FieldRepository, RepositoryError};

/// 新建字段请求体
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateFieldRequest {
    #[serde(default)]
    pub field_name: String,
    #[serde(default)]
    pub label: String,
    /// text | number | dropdown，缺省 text
    #[serde(default)]
    pub field_type: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldResponse {
    pub field: CustomFieldDefinition,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldListResponse {
    pub fields: Vec<CustomFieldDefinition>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldDeleteResponse {
    pub message: String,
}

pub struct FieldApi {
    field_repo: Arc<FieldRepository>,
}

impl FieldApi {
    pub fn new(field_repo: Arc<FieldRepository>) -> Self {
        Self { field_repo }
    }

    /// 新建字段定义（管理员）
    ///
    /// field_name 按表头同样的规则归一化，保证导入列能命中定义。
    pub fn create_field(
        &self,
        request: CreateFieldRequest,
        user: &UserContext,
    ) -> ApiResult<FieldResponse> {
        require_admin(user)?;

        let field_name = ColumnNormalizer::normalize_key(&request.field_name);
        if field_name.is_empty() {
            return Err(ApiError::InvalidInput("field_name is required".to_string()));
        }
        if ColumnNormalizer::is_standard_field(&field_name) {
            return Err(ApiError::InvalidInput(format!(
                "{} is a standard part field",
                field_name
            )));
        }

        let label = request.label.trim().to_string();
        if label.is_empty() {
            return Err(ApiError::InvalidInput("label is required".to_string()));
        }

        let field_type = match request.field_type.as_deref().map(str::trim) {
            None | Some("") => FieldType::Text,
            Some(raw) => FieldType::parse(raw).ok_or_else(|| {
                ApiError::InvalidInput(
                    "field_type must be one of: text, number, dropdown".to_string(),
                )
            })?,
        };

        let options: Vec<String> = request
            .options
            .iter()
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();
        let options = match field_type {
            FieldType::Dropdown if options.is_empty() => {
                return Err(ApiError::InvalidInput(
                    "options array is required for dropdown field type".to_string(),
                ))
            }
            FieldType::Dropdown => options,
            _ => Vec::new(),
        };

        let field = CustomFieldDefinition {
            field_id: Uuid::new_v4().to_string(),
            field_name,
            label,
            field_type,
            options,
            created_by: user.email.clone(),
            created_at: Utc::now(),
        };

        match self.field_repo.insert(&field) {
            Ok(()) => {}
            Err(RepositoryError::UniqueConstraintViolation(_)) => {
                return Err(ApiError::Conflict(format!(
                    "Field {} already exists",
                    field.field_name
                )))
            }
            Err(e) => return Err(e.into()),
        }

        info!(field_name = %field.field_name, field_type = %field.field_type.as_str(), user = %user.email, "字段定义已创建");
        Ok(FieldResponse { field })
    }

    /// 全部字段定义
    pub fn list_fields(&self) -> ApiResult<FieldListResponse> {
        Ok(FieldListResponse {
            fields: self.field_repo.list_all()?,
        })
    }

    /// 删除字段定义（管理员）；已有零件上的值保留为孤立字段
    pub fn delete_field(&self, field_id: &str, user: &UserContext) -> ApiResult<FieldDeleteResponse> {
        require_admin(user)?;

        if !self.field_repo.delete(field_id)? {
            return Err(ApiError::NotFound(format!("Field {} not found", field_id)));
        }

        info!(field_id = field_id, user = %user.email, "字段定义已删除");
        Ok(FieldDeleteResponse {
            message: "Field deleted".to_string(),
        })
    }
}
