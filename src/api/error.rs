// ==========================================
// 赛车零件追踪系统 - API层错误类型
// ==========================================
// 职责: 汇总仓储 / 引擎 / 导入错误，转换为调用方可理解的错误
// 说明: 每个错误都带显式原因；HTTP 状态映射见 app::http::error
// ==========================================

use crate::engine::car_lock::CarLockError;
use crate::engine::error::WorkflowError;
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 身份与权限
    // ==========================================
    #[error("未认证: {0}")]
    Unauthorized(String),

    #[error("无权限: {0}")]
    Forbidden(String),

    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    /// 里程非正数或非有限值（调用方按 INVALID_MILES 识别）
    #[error("无效里程: {0}")]
    InvalidMiles(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("资源冲突: {0}")]
    Conflict(String),

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    // ==========================================
    // 导入错误
    // ==========================================
    #[error("文件导入失败: {0}")]
    ImportError(String),

    /// 多个表头归一化到同一字段，整文件拒绝
    #[error("表头冲突: {0}")]
    HeaderCollision(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("并发控制失败: {0}")]
    LockError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),
}

impl ApiError {
    /// 机器可读错误码
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::InvalidMiles(_) => "INVALID_MILES",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::BusinessRuleViolation(_) => "BUSINESS_RULE_VIOLATION",
            ApiError::ImportError(_) => "IMPORT_ERROR",
            ApiError::HeaderCollision(_) => "HEADER_COLLISION",
            ApiError::DatabaseError(_) => "DB_ERROR",
            ApiError::LockError(_) => "LOCK_ERROR",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::Conflict(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("外键约束违反: {}", msg))
            }
            RepositoryError::BusinessRuleViolation(msg) => ApiError::BusinessRuleViolation(msg),
            RepositoryError::LockError(msg) => {
                ApiError::LockError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::SerializationError { field, message } => {
                ApiError::InternalError(format!("字段{}序列化失败: {}", field, message))
            }
        }
    }
}

// ==========================================
// 从 WorkflowError 转换
// ==========================================
impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::InvalidMiles(_) => ApiError::InvalidMiles(err.to_string()),
            WorkflowError::InvalidReason(_) => ApiError::InvalidInput(err.to_string()),
            WorkflowError::PartNotFound(_) => ApiError::NotFound(err.to_string()),
            WorkflowError::PartNotOnCar { .. } => ApiError::Forbidden(err.to_string()),
            WorkflowError::PartAlreadyRetired(_) => {
                ApiError::BusinessRuleViolation(err.to_string())
            }
            WorkflowError::Lock(e) => e.into(),
            WorkflowError::Repository(e) => e.into(),
        }
    }
}

impl From<CarLockError> for ApiError {
    fn from(err: CarLockError) -> Self {
        ApiError::LockError(err.to_string())
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Lock(e) => e.into(),
            ImportError::Repository(e) => e.into(),
            collision @ ImportError::HeaderCollision { .. } => {
                ApiError::HeaderCollision(collision.to_string())
            }
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
