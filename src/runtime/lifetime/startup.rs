use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::config::{StaticConfig, get_config};
use crate::services::{GeoIpProvider, LinkService, TrackingService};
use crate::storage::{SeaOrmStorage, StorageFactory, UrlStore};
use crate::utils::ip::TrustedProxies;

pub struct StartupContext {
    pub storage: Arc<SeaOrmStorage>,
    pub store: Arc<dyn UrlStore>,
    pub link_service: LinkService,
    pub tracking_service: TrackingService,
    pub trusted_proxies: TrustedProxies,
}

/// 按配置组装业务服务
pub fn build_services(
    store: Arc<dyn UrlStore>,
    config: &StaticConfig,
) -> (LinkService, TrackingService) {
    let geoip = if config.geoip.enabled {
        Some(GeoIpProvider::new(&config.geoip))
    } else {
        info!("GeoIP lookup is disabled in configuration");
        None
    };

    let link_service = LinkService::new(store.clone(), &config.links);
    let tracking_service = TrackingService::new(store, geoip);
    (link_service, tracking_service)
}

/// 准备服务器启动的上下文：连接数据库、执行迁移、构建服务
pub async fn prepare_server_startup() -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let config = get_config();

    let storage = StorageFactory::create(&config.database)
        .await
        .context("Failed to create storage backend")?;
    info!(
        "Using storage backend: {}",
        storage.get_backend_config().storage_type
    );

    let store: Arc<dyn UrlStore> = storage.clone();
    let (link_service, tracking_service) = build_services(store.clone(), &config);

    // 只在启动时解析一次，无效条目在这里告警
    let trusted_proxies = TrustedProxies::from_config(&config.api.trusted_proxies);

    debug!(
        "Pre-startup processing completed in {:?}",
        start_time.elapsed()
    );

    Ok(StartupContext {
        storage,
        store,
        link_service,
        tracking_service,
        trusted_proxies,
    })
}
