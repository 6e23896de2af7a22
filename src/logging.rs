// ==========================================
// 日志系统初始化
// ==========================================
// 使用 tracing 和 tracing-subscriber
// 支持 RUST_LOG 环境变量与 JSON 输出
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 日志输出格式环境变量（取值 json 时输出结构化 JSON）
pub const LOG_FORMAT_ENV: &str = "PARTS_TRACKER_LOG_FORMAT";

/// 初始化日志系统
///
/// # 环境变量
/// - RUST_LOG: 日志级别过滤器（默认: info）
///   例如: RUST_LOG=debug 或 RUST_LOG=parts_tracker=trace,tower_http=debug
/// - PARTS_TRACKER_LOG_FORMAT: `json` 时输出 JSON 行，否则为可读文本
///
/// # 示例
/// ```no_run
/// use parts_tracker::logging;
/// logging::init();
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var(LOG_FORMAT_ENV)
        .map(|v| v.trim().eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if use_json {
        fmt()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .init();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(false)
            .with_line_number(true)
            .init();
    }
}

/// 初始化测试环境的日志系统
///
/// 使用 debug 级别，重复调用安全
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
