// ==========================================
// 赛车零件追踪系统 - 配置管理器
// ==========================================
// 职责: 运行期可调参数的读取与覆写
// 存储: config_kv 表 (key-value)
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// 配置键
pub mod config_keys {
    /// 高里程报表默认条数
    pub const HIGH_MILES_LIMIT: &str = "report.high_miles.limit";
    /// 更换历史默认条数
    pub const HISTORY_LIMIT: &str = "report.history.limit";
    /// 里程记录默认条数
    pub const MILES_LOG_LIMIT: &str = "report.miles_log.limit";
    /// 单文件最大数据行数
    pub const IMPORT_MAX_ROWS: &str = "import.max_rows";
}

/// 默认值
pub mod config_defaults {
    pub const HIGH_MILES_LIMIT: usize = 20;
    pub const HISTORY_LIMIT: usize = 100;
    pub const MILES_LOG_LIMIT: usize = 50;
    pub const IMPORT_MAX_ROWS: usize = 5_000;
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 写入（覆盖）配置值
    pub fn set_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO config_kv (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = datetime('now')
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    /// 全部配置快照
    pub fn get_config_snapshot(&self) -> RepositoryResult<HashMap<String, String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT key, value FROM config_kv ORDER BY key")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut config_map = HashMap::new();
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }
        Ok(config_map)
    }

    /// 读取正整数配置；缺失或非法时回退默认值
    fn get_usize_or_default(&self, key: &str, default: usize) -> RepositoryResult<usize> {
        let value = match self.get_config_value(key)? {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(v) if v > 0 => v,
                _ => {
                    tracing::warn!(key = key, value = %raw, default = default, "配置值非法，使用默认值");
                    default
                }
            },
            None => default,
        };
        Ok(value)
    }

    // ===== 报表配置 =====

    pub fn high_miles_default_limit(&self) -> RepositoryResult<usize> {
        self.get_usize_or_default(config_keys::HIGH_MILES_LIMIT, config_defaults::HIGH_MILES_LIMIT)
    }

    pub fn history_default_limit(&self) -> RepositoryResult<usize> {
        self.get_usize_or_default(config_keys::HISTORY_LIMIT, config_defaults::HISTORY_LIMIT)
    }

    pub fn miles_log_default_limit(&self) -> RepositoryResult<usize> {
        self.get_usize_or_default(config_keys::MILES_LOG_LIMIT, config_defaults::MILES_LOG_LIMIT)
    }

    // ===== 导入配置 =====

    pub fn import_max_rows(&self) -> RepositoryResult<usize> {
        self.get_usize_or_default(config_keys::IMPORT_MAX_ROWS, config_defaults::IMPORT_MAX_ROWS)
    }
}
