// ==========================================
// 赛车零件追踪系统 - 应用状态
// ==========================================
// 职责: 组装共享连接、仓储、引擎与 API 实例
// 说明: 所有字段为 Arc，Clone 廉价，可直接作为 axum State
// ==========================================

use rusqlite::Connection;
use std::sync::{Arc, Mutex};

use crate::api::{FieldApi, ImportApi, MileageApi, PartApi, ReplacementApi, ReportApi};
use crate::config::ConfigManager;
use crate::db::{configure_sqlite_connection, ensure_schema, open_sqlite_connection};
use crate::engine::{CarLockRegistry, MileageLedger, ReplacementWorkflow};
use crate::importer::SpreadsheetImporter;
use crate::repository::{FieldRepository, HistoryRepository, MileageRepository, PartRepository};

/// 应用状态
#[derive(Clone)]
pub struct AppState {
    /// 数据库路径（内存库为 ":memory:"）
    pub db_path: String,

    /// 配置管理器
    pub config: Arc<ConfigManager>,

    /// 零件管理API
    pub part_api: Arc<PartApi>,

    /// 自定义字段API
    pub field_api: Arc<FieldApi>,

    /// 表格导入API
    pub import_api: Arc<ImportApi>,

    /// 里程API
    pub mileage_api: Arc<MileageApi>,

    /// 零件更换API
    pub replacement_api: Arc<ReplacementApi>,

    /// 可靠性报表API
    pub report_api: Arc<ReportApi>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 返回
    /// - Ok(AppState): 应用状态实例
    /// - Err(String): 初始化错误
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        Self::from_connection(db_path, conn)
    }

    /// 基于已打开的连接组装状态（测试使用内存库）
    pub fn from_connection(db_path: String, conn: Connection) -> Result<Self, String> {
        configure_sqlite_connection(&conn).map_err(|e| format!("连接配置失败: {}", e))?;
        ensure_schema(&conn).map_err(|e| format!("建表失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let part_repo = Arc::new(PartRepository::new(conn.clone()));
        let history_repo = Arc::new(HistoryRepository::new(conn.clone()));
        let mileage_repo = Arc::new(MileageRepository::new(conn.clone()));
        let field_repo = Arc::new(FieldRepository::new(conn.clone()));
        let config = Arc::new(ConfigManager::from_connection(conn));

        // ==========================================
        // 初始化Engine层
        // ==========================================
        let locks = Arc::new(CarLockRegistry::new());
        let ledger = Arc::new(MileageLedger::new(mileage_repo.clone(), locks.clone()));
        let workflow = Arc::new(ReplacementWorkflow::new(
            part_repo.clone(),
            history_repo.clone(),
            locks.clone(),
        ));

        let max_rows = config
            .import_max_rows()
            .map_err(|e| format!("读取导入上限失败: {}", e))?;
        let importer = Arc::new(SpreadsheetImporter::new(
            part_repo.clone(),
            field_repo.clone(),
            locks.clone(),
            max_rows,
        ));

        // ==========================================
        // 创建API实例
        // ==========================================
        let part_api = Arc::new(PartApi::new(
            part_repo.clone(),
            field_repo.clone(),
            locks,
        ));
        let field_api = Arc::new(FieldApi::new(field_repo));
        let import_api = Arc::new(ImportApi::new(importer));
        let mileage_api = Arc::new(MileageApi::new(ledger, mileage_repo, config.clone()));
        let replacement_api = Arc::new(ReplacementApi::new(
            workflow,
            history_repo.clone(),
            config.clone(),
        ));
        let report_api = Arc::new(ReportApi::new(part_repo, history_repo, config.clone()));

        tracing::info!(max_import_rows = max_rows, "AppState初始化完成");

        Ok(Self {
            db_path,
            config,
            part_api,
            field_api,
            import_api,
            mileage_api,
            replacement_api,
            report_api,
        })
    }

    /// 获取数据库路径
    pub fn get_db_path(&self) -> &str {
        &self.db_path
    }
}
