// ==========================================
// 赛车零件追踪系统 - 配置层
// ==========================================
// app_config: 进程级（环境变量）
// config_manager: 运行期（config_kv 表）
// ==========================================

pub mod app_config;
pub mod config_manager;

pub use app_config::{get_default_db_path, AppConfig};
pub use config_manager::{config_defaults, config_keys, ConfigManager};
