use anyhow::Result;
use log::{error, info};
use sora_scanner::config::{Config, StorageBackend};
use sora_scanner::database::RedisStore;
use sora_scanner::db::SqliteStore;
use sora_scanner::{CodeScanner, DiscordWebhook, FileStore, RedditClient, Schedule, SeenStore};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // 加载环境变量（RUST_LOG 也可以写在 .env 中）
    dotenv::dotenv().ok();

    // 初始化日志
    env_logger::init();

    let config = Config::from_env()?;

    info!("Sora 扫描器启动，每 {:?} 检查一次...", config.interval);

    // 选择存储后端
    let store: Arc<dyn SeenStore> = match &config.storage {
        StorageBackend::File(path) => Arc::new(FileStore::new(path)),
        StorageBackend::Sqlite(url) => Arc::new(SqliteStore::new(url).await?),
        StorageBackend::Redis { url, key } => Arc::new(RedisStore::new(url, key.clone()).await?),
    };
    store.init().await?;

    info!("存储后端初始化完成");

    let source = Arc::new(RedditClient::new(config.credentials.clone(), config.http_timeout)?);
    let notifier = Arc::new(DiscordWebhook::new(config.webhook_url.clone(), config.http_timeout)?);
    let scanner = CodeScanner::new(source, store, notifier, config.scan.clone());
    let schedule = Schedule::new(config.interval, config.poll_tick, config.run_on_start);

    tokio::select! {
        result = scanner.start_scanning(schedule) => {
            if let Err(e) = result {
                error!("扫描器错误: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("收到退出信号，扫描器关闭");
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("监听 Ctrl-C 失败: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("监听 SIGTERM 失败: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
