// ==========================================
// 赛车零件追踪系统 - 导入层
// ==========================================
// 职责: 外部表格（CSV / Excel）→ 在用零件
// 管道: 文件解析 → 表头归一化 → 行校验 → 查重 → 落库
// ==========================================

// 模块声明
pub mod column_normalizer;
pub mod error;
pub mod file_parser;
pub mod part_importer_impl;
pub mod part_importer_trait;
pub mod row_validator;

// 重导出核心类型
pub use column_normalizer::{ColumnNormalizer, NormalizedRow, STANDARD_FIELDS};
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, ExcelFlavor, ExcelParser, UniversalFileParser};
pub use part_importer_impl::SpreadsheetImporter;
pub use row_validator::{coerce_extra_value, DuplicateGuard, RowOutcome, RowValidator};

// 重导出 Trait 接口
pub use part_importer_trait::{FileParser, PartImporter, TabularData};
