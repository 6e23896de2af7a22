// ==========================================
// 赛车零件追踪系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite + axum
// 系统定位: 零件可靠性分析（失效风险 / MBF / 表格导入）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 导入层 - 外部表格数据
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - HTTP 集成
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    FieldType, PartGroup, PartLocation, ReplacementReason, RiskLabel, UserRole,
};

// 领域实体
pub use domain::{
    CustomFieldDefinition, ExtraValue, ImportSummary, MbfStat, MileageLogEntry, Part, PartDraft,
    ReplacementRecord, RiskAssessment, UserContext,
};

// 引擎
pub use engine::{
    CarLockRegistry, MbfAggregator, MileageLedger, ReplacementWorkflow, RiskScorer,
};

// 导入
pub use importer::{ColumnNormalizer, RowValidator, SpreadsheetImporter};

// API
pub use api::{FieldApi, ImportApi, MileageApi, PartApi, ReplacementApi, ReportApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "赛车零件追踪系统";
