// ==========================================
// 赛车零件追踪系统 - 零件管理 API
// ==========================================
// 职责: 零件增删改查 + 自定义字段写入校验
// 红线: 同车在用零件号唯一；写入的 extra_fields 必须有字段定义
// 说明: 读取时对已删除定义的遗留字段打 orphaned_fields 标记，不报错
// ==========================================

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::api::access::{require_admin, require_car_id, require_write};
use crate::api::error::{ApiError, ApiResult};
use crate::domain::field::{index_by_name, CustomFieldDefinition, FieldWarning, FieldWarningReason};
use crate::domain::part::{ExtraFields, ExtraValue, Part, PartDraft, PartUpdate};
use crate::domain::types::{FieldType, PartGroup, PartLocation};
use crate::domain::user::UserContext;
use crate::engine::CarLockRegistry;
use crate::repository::{FieldRepository, PartRepository};

// ==========================================
// 请求 / 响应
// ==========================================

/// 新建零件请求体
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatePartRequest {
    #[serde(default)]
    pub part_number: String,
    #[serde(default)]
    pub part_name: String,
    #[serde(default)]
    pub part_group: String,
    #[serde(default)]
    pub part_location: String,
    #[serde(default)]
    pub miles_used: Option<f64>,
    #[serde(default)]
    pub purchased_from: Option<String>,
    #[serde(default)]
    pub cost: Option<String>,
    #[serde(default)]
    pub extra_fields: ExtraFields,
}

/// 修改零件请求体（部分更新，extra_fields 合并）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePartRequest {
    pub part_number: Option<String>,
    pub part_name: Option<String>,
    pub part_group: Option<String>,
    pub part_location: Option<String>,
    pub miles_used: Option<f64>,
    pub purchased_from: Option<String>,
    pub cost: Option<String>,
    pub extra_fields: Option<ExtraFields>,
}

/// 列表过滤参数
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartListParams {
    pub group: Option<String>,
    pub location: Option<String>,
}

/// 零件读视图（附带遗留字段标记）
#[derive(Debug, Clone, Serialize)]
pub struct PartView {
    #[serde(flatten)]
    pub part: Part,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub orphaned_fields: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PartResponse {
    pub part: PartView,
}

#[derive(Debug, Clone, Serialize)]
pub struct PartListResponse {
    pub parts: Vec<PartView>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PartWriteResponse {
    pub message: String,
    pub part_id: String,
    pub part: Part,
    pub warnings: Vec<FieldWarning>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PartDeleteResponse {
    pub message: String,
    pub part_id: String,
}

// ==========================================
// PartApi
// ==========================================
pub struct PartApi {
    part_repo: Arc<PartRepository>,
    field_repo: Arc<FieldRepository>,
    locks: Arc<CarLockRegistry>,
}

impl PartApi {
    pub fn new(
        part_repo: Arc<PartRepository>,
        field_repo: Arc<FieldRepository>,
        locks: Arc<CarLockRegistry>,
    ) -> Self {
        Self {
            part_repo,
            field_repo,
            locks,
        }
    }

    /// 新建零件
    ///
    /// # 返回
    /// - Ok(PartWriteResponse): 新零件 + 下拉值软告警
    /// - Err(InvalidInput): 必填缺失 / 枚举非法 / 未定义字段 / 数值字段非数字
    /// - Err(Conflict): 同车已有同号在用零件
    #[instrument(skip(self, request, user), fields(user = %user.email))]
    pub fn create_part(
        &self,
        car_id: &str,
        request: CreatePartRequest,
        user: &UserContext,
    ) -> ApiResult<PartWriteResponse> {
        require_write(user)?;
        let car_id = require_car_id(car_id)?;

        let part_number = required_text("part_number", &request.part_number)?;
        let part_name = required_text("part_name", &request.part_name)?;
        let part_group = parse_group(&request.part_group)?;
        let part_location = parse_location(&request.part_location)?;
        let miles_used = match request.miles_used {
            Some(m) => validate_miles(m)?,
            None => 0.0,
        };

        let defs = index_by_name(self.field_repo.list_all()?);
        let (extra_fields, warnings) = validate_extra_fields(&defs, &request.extra_fields)?;

        let draft = PartDraft {
            part_number,
            part_name,
            part_group,
            part_location,
            miles_used,
            purchased_from: optional_text(request.purchased_from),
            cost: optional_text(request.cost),
            extra_fields: extra_fields
                .into_iter()
                .filter_map(|(k, v)| v.map(|v| (k, v)))
                .collect(),
        };

        let part = self.locks.with_car_lock(car_id, || -> ApiResult<Part> {
            if self
                .part_repo
                .active_number_taken(car_id, &draft.part_number, None)?
            {
                return Err(duplicate_number(&draft.part_number));
            }
            let part = draft.into_part(car_id, &user.email, Utc::now());
            self.part_repo.insert(&part)?;
            Ok(part)
        })?;

        info!(car_id = car_id, part_id = %part.part_id, part_number = %part.part_number, "零件已创建");

        Ok(PartWriteResponse {
            message: "Part created".to_string(),
            part_id: part.part_id.clone(),
            part,
            warnings,
        })
    }

    /// 查询单个零件
    pub fn get_part(&self, car_id: &str, part_id: &str) -> ApiResult<PartResponse> {
        let car_id = require_car_id(car_id)?;
        let part = self.load_owned(car_id, part_id)?;
        let defs = index_by_name(self.field_repo.list_all()?);

        Ok(PartResponse {
            part: to_view(part, &defs),
        })
    }

    /// 查询车辆在用零件
    pub fn list_parts(&self, car_id: &str, params: PartListParams) -> ApiResult<PartListResponse> {
        let car_id = require_car_id(car_id)?;
        let group = params
            .group
            .as_deref()
            .filter(|g| !g.trim().is_empty())
            .map(parse_group)
            .transpose()?;
        let location = params
            .location
            .as_deref()
            .filter(|l| !l.trim().is_empty())
            .map(parse_location)
            .transpose()?;

        let defs = index_by_name(self.field_repo.list_all()?);
        let parts: Vec<PartView> = self
            .part_repo
            .list_active(car_id, group, location)?
            .into_iter()
            .map(|p| to_view(p, &defs))
            .collect();

        Ok(PartListResponse {
            count: parts.len(),
            parts,
        })
    }

    /// 修改零件
    ///
    /// 管理员编辑是降低 miles_used 的唯一途径。
    #[instrument(skip(self, request, user), fields(user = %user.email))]
    pub fn update_part(
        &self,
        car_id: &str,
        part_id: &str,
        request: UpdatePartRequest,
        user: &UserContext,
    ) -> ApiResult<PartWriteResponse> {
        require_write(user)?;
        let car_id = require_car_id(car_id)?;

        let mut update = PartUpdate::default();
        let mut touched = false;

        if let Some(v) = &request.part_number {
            update.part_number = Some(required_text("part_number", v)?);
            touched = true;
        }
        if let Some(v) = &request.part_name {
            update.part_name = Some(required_text("part_name", v)?);
            touched = true;
        }
        if let Some(v) = &request.part_group {
            update.part_group = Some(parse_group(v)?);
            touched = true;
        }
        if let Some(v) = &request.part_location {
            update.part_location = Some(parse_location(v)?);
            touched = true;
        }
        if let Some(m) = request.miles_used {
            update.miles_used = Some(validate_miles(m)?);
            touched = true;
        }
        if let Some(v) = request.purchased_from {
            update.purchased_from = Some(v.trim().to_string());
            touched = true;
        }
        if let Some(v) = request.cost {
            update.cost = Some(v.trim().to_string());
            touched = true;
        }

        let mut warnings = Vec::new();
        let mut cleared = Vec::new();
        if let Some(extra) = &request.extra_fields {
            let defs = index_by_name(self.field_repo.list_all()?);
            let (validated, field_warnings) = validate_extra_fields(&defs, extra)?;
            let mut merged = ExtraFields::new();
            for (key, value) in validated {
                match value {
                    Some(v) => {
                        merged.insert(key, v);
                    }
                    None => cleared.push(key),
                }
            }
            update.extra_fields = Some(merged);
            warnings = field_warnings;
            touched = true;
        }

        if !touched {
            return Err(ApiError::InvalidInput("Nothing to update".to_string()));
        }

        let part = self.locks.with_car_lock(car_id, || -> ApiResult<Part> {
            let mut part = self.load_owned(car_id, part_id)?;
            if !part.active {
                return Err(ApiError::BusinessRuleViolation(format!(
                    "零件 {} 已退役，不能修改",
                    part.part_id
                )));
            }
            if let Some(number) = &update.part_number {
                if self
                    .part_repo
                    .active_number_taken(car_id, number, Some(&part.part_id))?
                {
                    return Err(duplicate_number(number));
                }
            }

            update.apply(&mut part, Utc::now());
            for key in &cleared {
                part.extra_fields.remove(key);
            }
            self.part_repo.update(&part)?;
            Ok(part)
        })?;

        info!(car_id = car_id, part_id = %part.part_id, "零件已修改");

        Ok(PartWriteResponse {
            message: "Part updated".to_string(),
            part_id: part.part_id.clone(),
            part,
            warnings,
        })
    }

    /// 物理删除零件（管理员）
    pub fn delete_part(
        &self,
        car_id: &str,
        part_id: &str,
        user: &UserContext,
    ) -> ApiResult<PartDeleteResponse> {
        require_admin(user)?;
        let car_id = require_car_id(car_id)?;

        self.locks.with_car_lock(car_id, || -> ApiResult<()> {
            self.load_owned(car_id, part_id)?;
            if !self.part_repo.delete(part_id)? {
                return Err(ApiError::NotFound(format!("Part {} not found", part_id)));
            }
            Ok(())
        })?;

        warn!(car_id = car_id, part_id = part_id, user = %user.email, "零件已物理删除");

        Ok(PartDeleteResponse {
            message: "Part deleted".to_string(),
            part_id: part_id.to_string(),
        })
    }

    /// 加载零件并确认归属车辆
    fn load_owned(&self, car_id: &str, part_id: &str) -> ApiResult<Part> {
        let part = self
            .part_repo
            .find_by_id(part_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Part {} not found", part_id)))?;
        if part.car_id != car_id {
            return Err(ApiError::Forbidden(
                "Part does not belong to this car".to_string(),
            ));
        }
        Ok(part)
    }
}

// ==========================================
// 校验辅助函数
// ==========================================

fn required_text(field: &str, value: &str) -> ApiResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::InvalidInput(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_group(raw: &str) -> ApiResult<PartGroup> {
    PartGroup::parse(raw).ok_or_else(|| {
        let valid: Vec<&str> = PartGroup::ALL.iter().map(|g| g.as_str()).collect();
        ApiError::InvalidInput(format!("part_group must be one of: {}", valid.join(", ")))
    })
}

fn parse_location(raw: &str) -> ApiResult<PartLocation> {
    PartLocation::parse(raw).ok_or_else(|| {
        let valid: Vec<&str> = PartLocation::ALL.iter().map(|l| l.as_str()).collect();
        ApiError::InvalidInput(format!("part_location must be one of: {}", valid.join(", ")))
    })
}

fn validate_miles(miles: f64) -> ApiResult<f64> {
    if !miles.is_finite() || miles < 0.0 {
        return Err(ApiError::InvalidInput(format!(
            "miles_used must be a non-negative number: {}",
            miles
        )));
    }
    Ok(miles)
}

fn duplicate_number(part_number: &str) -> ApiError {
    ApiError::Conflict(format!(
        "An active part with part_number {} already exists on this car",
        part_number
    ))
}

/// 按字段定义校验手工写入的 extra_fields
///
/// # 返回
/// - 每个键对应 Some(值) 或 None（空值，表示不保存 / 清除）
/// - 下拉值不在选项内的软告警
///
/// 未定义字段与无法转换的数值字段直接拒绝。
pub fn validate_extra_fields(
    defs: &HashMap<String, CustomFieldDefinition>,
    extra: &ExtraFields,
) -> ApiResult<(Vec<(String, Option<ExtraValue>)>, Vec<FieldWarning>)> {
    let mut values = Vec::with_capacity(extra.len());
    let mut warnings = Vec::new();

    for (key, value) in extra {
        let def = defs.get(key).ok_or_else(|| {
            ApiError::InvalidInput(format!("Unknown extra field: {}", key))
        })?;

        if value.is_blank() {
            values.push((key.clone(), None));
            continue;
        }

        let stored = match def.field_type {
            FieldType::Number => match value {
                ExtraValue::Number(n) => ExtraValue::Number(*n),
                ExtraValue::Text(s) => match s.trim().parse::<f64>() {
                    Ok(n) if n.is_finite() => ExtraValue::Number(n),
                    _ => {
                        return Err(ApiError::InvalidInput(format!(
                            "Field {} expects a number, got {}",
                            key, s
                        )))
                    }
                },
            },
            FieldType::Text => ExtraValue::Text(value.to_string()),
            FieldType::Dropdown => {
                let text = value.to_string();
                if !def.allows_option(&text) {
                    warnings.push(FieldWarning {
                        row: None,
                        field: key.clone(),
                        reason: FieldWarningReason::DropdownValueNotInOptions,
                        value: text.clone(),
                    });
                }
                ExtraValue::Text(text)
            }
        };
        values.push((key.clone(), Some(stored)));
    }

    Ok((values, warnings))
}

fn to_view(part: Part, defs: &HashMap<String, CustomFieldDefinition>) -> PartView {
    let orphaned_fields = part
        .extra_fields
        .keys()
        .filter(|k| !defs.contains_key(*k))
        .cloned()
        .collect();
    PartView {
        part,
        orphaned_fields,
    }
}
