// ==========================================
// 赛车零件追踪系统 - 导入模块错误类型
// ==========================================
// 说明: 这里只有“整文件”级错误；行级问题写入 ImportSummary
// 工具: thiserror 派生宏
// ==========================================

use crate::engine::car_lock::CarLockError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xls/.csv）")]
    UnsupportedFormat(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    #[error("文件无数据行")]
    EmptyFile,

    #[error("文件行数超限: {rows} 行（上限 {max} 行）")]
    TooManyRows { rows: usize, max: usize },

    // ===== 表头错误 =====
    #[error("表头冲突: 列 \"{first}\" 与 \"{second}\" 归一化后均为 {key}")]
    HeaderCollision {
        key: String,
        first: String,
        second: String,
    },

    // ===== 基础设施错误 =====
    #[error(transparent)]
    Lock(#[from] CarLockError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

pub type ImportResult<T> = Result<T, ImportError>;
