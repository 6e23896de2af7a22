// ==========================================
// 赛车零件追踪系统 - 表格导入 API
// ==========================================
// 职责: 接收 base64 编码的上传文件，调用导入器并返回逐行明细
// ==========================================

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::api::access::{require_car_id, require_write};
use crate::api::error::{ApiError, ApiResult};
use crate::domain::import::ImportSummary;
use crate::domain::user::UserContext;
use crate::importer::{PartImporter, SpreadsheetImporter};

/// 上传请求体
#[derive(Debug, Clone, Deserialize)]
pub struct UploadRequest {
    /// 原始文件名（用于判断格式）
    pub filename: String,
    /// 文件内容（base64，可带 data URL 前缀）
    pub content: String,
}

/// 导入响应
#[derive(Debug, Clone, Serialize)]
pub struct ImportApiResponse {
    pub message: String,
    #[serde(flatten)]
    pub summary: ImportSummary,
}

/// 导入API
pub struct ImportApi {
    importer: Arc<SpreadsheetImporter>,
}

impl ImportApi {
    pub fn new(importer: Arc<SpreadsheetImporter>) -> Self {
        Self { importer }
    }

    /// 上传并导入表格
    ///
    /// # 参数
    /// - car_id: 目标车辆
    /// - request: 文件名 + base64 内容
    /// - user: 操作人（需写权限）
    ///
    /// # 返回
    /// - Ok(ImportApiResponse): 汇总 + 逐行明细（零导入也是正常结果）
    /// - Err(ApiError): 文件级错误（格式 / 编码 / 表头冲突 / 空文件）
    pub fn upload_spreadsheet(
        &self,
        car_id: &str,
        request: UploadRequest,
        user: &UserContext,
    ) -> ApiResult<ImportApiResponse> {
        require_write(user)?;
        let car_id = require_car_id(car_id)?;

        if request.filename.trim().is_empty() {
            return Err(ApiError::InvalidInput("filename 不能为空".to_string()));
        }
        let bytes = decode_upload(&request.content)?;

        let summary = self
            .importer
            .import_file(car_id, request.filename.trim(), &bytes, user)?;

        info!(
            car_id = car_id,
            user = %user.email,
            imported = summary.imported_count,
            skipped = summary.skipped_count,
            errors = summary.error_count,
            "表格导入请求完成"
        );

        Ok(ImportApiResponse {
            message: summary.message(),
            summary,
        })
    }
}

/// 解码上传内容，兼容 `data:<mime>;base64,` 前缀
pub fn decode_upload(content: &str) -> ApiResult<Vec<u8>> {
    let payload = match content.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => content,
    };
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err(ApiError::InvalidInput("文件内容为空".to_string()));
    }

    STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| ApiError::InvalidInput(format!("文件内容不是有效的 base64: {}", e)))
}
