// ==========================================
// 赛车零件追踪系统 - HTTP 服务主入口
// ==========================================
// 技术栈: axum + tokio + SQLite
// 身份由上游认证层通过请求头传入
// ==========================================

use anyhow::Context;
use parts_tracker::app::{create_router, AppState};
use parts_tracker::config::AppConfig;
use parts_tracker::logging;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志系统
    logging::init();

    info!("==================================================");
    info!("{}", parts_tracker::APP_NAME);
    info!("系统版本: {}", parts_tracker::VERSION);
    info!("==================================================");

    let config = AppConfig::from_env();
    info!("使用数据库: {}", config.db_path);

    let state = AppState::new(config.db_path.clone())
        .map_err(|e| anyhow::anyhow!("无法初始化AppState: {}", e))?;

    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("无法监听地址 {}", config.bind_addr))?;
    info!("服务已启动: http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("服务异常退出: {}", e);
            e
        })?;

    info!("服务已停止");
    Ok(())
}

/// 优雅停机信号（Ctrl+C / SIGTERM）
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("无法监听 Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("无法监听 SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("收到 Ctrl+C，正在停机..."),
        _ = terminate => info!("收到 SIGTERM，正在停机..."),
    }
}
