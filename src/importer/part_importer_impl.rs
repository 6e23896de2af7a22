// ==========================================
// 赛车零件追踪系统 - 表格导入器实现
// ==========================================
// 导入流程:
//   0. 文件解析（CSV / Excel）
//   1. 表头归一化（冲突 → 整文件失败）
//   2. 车辆锁内: 加载字段定义 + 现有在用零件号
//   3. 逐行: 校验 → 查重 → 落库（单行失败不影响后续行）
// 红线: 每一数据行恰好归入 imported / skipped / errors 之一
// ==========================================

use crate::domain::field::index_by_name;
use crate::domain::import::{
    ImportSummary, ImportedRow, RowError, RowErrorReason, RowSkip, SkipReason,
};
use crate::domain::user::UserContext;
use crate::engine::car_lock::CarLockRegistry;
use crate::importer::column_normalizer::ColumnNormalizer;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::part_importer_trait::{PartImporter, TabularData};
use crate::importer::row_validator::{DuplicateGuard, RowOutcome, RowValidator};
use crate::repository::error::RepositoryError;
use crate::repository::field_repo::FieldRepository;
use crate::repository::part_repo::PartRepository;
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

// ==========================================
// SpreadsheetImporter - 表格导入器
// ==========================================
pub struct SpreadsheetImporter {
    part_repo: Arc<PartRepository>,
    field_repo: Arc<FieldRepository>,
    locks: Arc<CarLockRegistry>,
    max_rows: usize,
}

impl SpreadsheetImporter {
    /// 创建导入器
    ///
    /// # 参数
    /// - max_rows: 单文件最大数据行数
    pub fn new(
        part_repo: Arc<PartRepository>,
        field_repo: Arc<FieldRepository>,
        locks: Arc<CarLockRegistry>,
        max_rows: usize,
    ) -> Self {
        Self {
            part_repo,
            field_repo,
            locks,
            max_rows,
        }
    }

    /// 导入已解析的表格
    ///
    /// # 参数
    /// - car_id: 目标车辆
    /// - table: 表头 + 数据行
    /// - user: 操作人
    pub fn import_table(
        &self,
        car_id: &str,
        table: &TabularData,
        user: &UserContext,
    ) -> ImportResult<ImportSummary> {
        if table.rows.is_empty() {
            return Err(ImportError::EmptyFile);
        }
        if table.rows.len() > self.max_rows {
            return Err(ImportError::TooManyRows {
                rows: table.rows.len(),
                max: self.max_rows,
            });
        }

        let normalizer = ColumnNormalizer::from_headers(&table.headers)?;
        let missing = normalizer.missing_required();
        if !missing.is_empty() {
            warn!(car_id = car_id, missing = ?missing, "表头缺少必填列，相关行将全部报错");
        }

        self.locks.with_car_lock(car_id, || -> ImportResult<ImportSummary> {
            let validator = RowValidator::new(index_by_name(self.field_repo.list_all()?));
            let mut guard = DuplicateGuard::new(self.part_repo.active_part_numbers(car_id)?);
            let mut summary = ImportSummary::default();

            for (idx, cells) in table.rows.iter().enumerate() {
                let row_no = idx + 1;
                let row = normalizer.normalize_row(cells);

                match validator.validate(row_no, &row) {
                    RowOutcome::Skipped(skip) => {
                        debug!(row = row_no, reason = ?skip.reason, "行已跳过");
                        summary.record_skipped(skip);
                    }
                    RowOutcome::Rejected(error) => {
                        warn!(row = row_no, reason = ?error.reason, detail = %error.detail, "行校验失败");
                        summary.record_error(error);
                    }
                    RowOutcome::Accepted { draft, warnings } => {
                        if guard.is_taken(&draft.part_number) {
                            summary.record_skipped(duplicate(row_no, &draft.part_number));
                            continue;
                        }

                        let part = draft.into_part(car_id, &user.email, Utc::now());
                        match self.part_repo.insert(&part) {
                            Ok(()) => {
                                guard.claim(&part.part_number);
                                summary.warnings.extend(warnings);
                                summary.record_imported(ImportedRow {
                                    row: row_no,
                                    part_id: part.part_id,
                                    part_number: part.part_number,
                                    part_name: part.part_name,
                                });
                            }
                            Err(RepositoryError::UniqueConstraintViolation(_)) => {
                                guard.claim(&part.part_number);
                                summary.record_skipped(duplicate(row_no, &part.part_number));
                            }
                            Err(e) => {
                                warn!(row = row_no, error = %e, "行写入失败");
                                summary.record_error(RowError {
                                    row: row_no,
                                    part_number: Some(part.part_number),
                                    reason: RowErrorReason::StorageError,
                                    field: None,
                                    detail: e.to_string(),
                                });
                            }
                        }
                    }
                }
            }

            Ok(summary)
        })
    }
}

fn duplicate(row_no: usize, part_number: &str) -> RowSkip {
    RowSkip {
        row: row_no,
        part_number: Some(part_number.to_string()),
        reason: SkipReason::DuplicatePartNumber,
    }
}

impl PartImporter for SpreadsheetImporter {
    #[instrument(skip(self, bytes, user), fields(size = bytes.len()))]
    fn import_file(
        &self,
        car_id: &str,
        filename: &str,
        bytes: &[u8],
        user: &UserContext,
    ) -> ImportResult<ImportSummary> {
        let start = Instant::now();

        // === 阶段 0: 文件解析 ===
        let table = UniversalFileParser.parse(filename, bytes)?;
        debug!(headers = ?table.headers, rows = table.rows.len(), "文件解析完成");

        // === 阶段 1-3: 归一化 / 校验 / 落库 ===
        let summary = self.import_table(car_id, &table, user)?;

        info!(
            imported = summary.imported_count,
            skipped = summary.skipped_count,
            errors = summary.error_count,
            warnings = summary.warnings.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "导入完成"
        );

        Ok(summary)
    }
}
