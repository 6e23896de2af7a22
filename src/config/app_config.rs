// ==========================================
// 赛车零件追踪系统 - 进程级配置
// ==========================================
// 来源: 环境变量（数据库路径 / 监听地址）
// ==========================================

use std::path::PathBuf;

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "PARTS_TRACKER_DB_PATH";
/// 监听地址环境变量
pub const BIND_ENV: &str = "PARTS_TRACKER_BIND";

const DEFAULT_PORT: &str = "3000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: String,
    pub bind_addr: String,
}

impl AppConfig {
    /// 从环境变量加载
    ///
    /// - PARTS_TRACKER_DB_PATH: 数据库路径（缺省为用户数据目录）
    /// - PARTS_TRACKER_BIND: 监听地址（缺省 0.0.0.0:$PORT，PORT 缺省 3000）
    pub fn from_env() -> Self {
        let bind_addr = non_empty_env(BIND_ENV).unwrap_or_else(|| {
            let port = non_empty_env("PORT").unwrap_or_else(|| DEFAULT_PORT.to_string());
            format!("0.0.0.0:{}", port)
        });

        Self {
            db_path: get_default_db_path(),
            bind_addr,
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// 获取默认数据库路径
///
/// 优先级: 环境变量 > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    if let Some(path) = non_empty_env(DB_PATH_ENV) {
        return path;
    }

    let mut path = PathBuf::from("./parts_tracker.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("parts-tracker");
        match std::fs::create_dir_all(&dir) {
            Ok(()) => path = dir.join("parts_tracker.db"),
            Err(e) => tracing::warn!(dir = %dir.display(), error = %e, "数据目录创建失败，回退到当前目录"),
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with(".db"));
    }
}
