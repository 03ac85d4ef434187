use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::get_config;
use crate::services::AppServices;
use crate::storage::{SeaOrmStorage, StorageFactory};

pub struct StartupContext {
    pub storage: Arc<SeaOrmStorage>,
    pub services: Arc<AppServices>,
}

/// 连接数据库（同时执行迁移）
pub async fn prepare_storage() -> Result<Arc<SeaOrmStorage>> {
    let storage = StorageFactory::create()
        .await
        .context("Failed to create storage backend")?;
    info!("Using storage backend: {}", storage.backend_name());
    Ok(storage)
}

/// 准备服务器启动的上下文：存储、media 目录与各 service
pub async fn prepare_server_startup() -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let config = get_config();
    let storage = prepare_storage().await?;

    tokio::fs::create_dir_all(&config.site.media_root)
        .await
        .with_context(|| format!("Failed to create media root {}", config.site.media_root))?;

    let services = AppServices::new(storage.clone(), &config.site)
        .context("Failed to initialize application services")?;

    // 提前初始化，空 secret 的告警出现在启动日志里
    let _ = crate::api::jwt::get_jwt_service();

    info!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );

    Ok(StartupContext {
        storage,
        services: Arc::new(services),
    })
}
