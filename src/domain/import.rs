// ==========================================
// 赛车零件追踪系统 - 导入结果模型
// ==========================================
// 每一数据行恰好归入 imported / skipped / errors 之一
// 行号: 从 1 开始，不含表头，空白行计入
// ==========================================

use crate::domain::field::FieldWarning;
use serde::{Deserialize, Serialize};

/// 行级错误原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowErrorReason {
    MissingRequiredField,
    InvalidGroup,
    InvalidLocation,
    InvalidMiles,
    StorageError,
}

/// 行级跳过原因（策略性排除，非数据错误）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    BlankRow,
    DuplicatePartNumber,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowError {
    pub row: usize,
    pub part_number: Option<String>,
    pub reason: RowErrorReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowSkip {
    pub row: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_number: Option<String>,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedRow {
    pub row: usize,
    pub part_id: String,
    pub part_number: String,
    pub part_name: String,
}

/// 导入汇总
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub imported_count: usize,
    pub skipped_count: usize,
    pub error_count: usize,
    pub imported: Vec<ImportedRow>,
    pub skipped: Vec<RowSkip>,
    pub errors: Vec<RowError>,
    pub warnings: Vec<FieldWarning>,
}

impl ImportSummary {
    pub fn record_imported(&mut self, row: ImportedRow) {
        self.imported_count += 1;
        self.imported.push(row);
    }

    pub fn record_skipped(&mut self, skip: RowSkip) {
        self.skipped_count += 1;
        self.skipped.push(skip);
    }

    pub fn record_error(&mut self, error: RowError) {
        self.error_count += 1;
        self.errors.push(error);
    }

    pub fn total_rows(&self) -> usize {
        self.imported_count + self.skipped_count + self.error_count
    }

    pub fn message(&self) -> String {
        format!(
            "Import complete: {} imported, {} skipped, {} errors",
            self.imported_count, self.skipped_count, self.error_count
        )
    }
}
