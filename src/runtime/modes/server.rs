//! Server mode
//!
//! This module contains the HTTP server startup logic.

use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::api::configure_routes;
use crate::api::services::AppStartTime;
use crate::config::{CorsConfig, get_config};
use crate::runtime::lifetime;

/// Build CORS middleware from configuration
pub fn build_cors_middleware(cors_config: &CorsConfig) -> Cors {
    let mut cors = Cors::default();

    if cors_config.allow_any_origin {
        cors = cors.allow_any_origin();
    } else {
        for origin in &cors_config.allowed_origins {
            cors = cors.allowed_origin(origin);
        }
    }

    let methods: Vec<actix_web::http::Method> = cors_config
        .allowed_methods
        .iter()
        .filter_map(|m| m.parse().ok())
        .collect();
    if !methods.is_empty() {
        cors = cors.allowed_methods(methods);
    }

    for header in &cors_config.allowed_headers {
        cors = cors.allowed_header(header.as_str());
    }

    cors.max_age(cors_config.max_age)
}

/// Run the HTTP server
///
/// **Note**: Logging and configuration must be initialized before calling this function
pub async fn run_server() -> Result<()> {
    let app_start_time = AppStartTime::default();

    let startup = lifetime::startup::prepare_server_startup()
        .await
        .inspect_err(|e| tracing::error!("Server startup failed: {:#}", e))?;

    let storage = startup.storage.clone();
    let store = startup.store.clone();
    let link_service = startup.link_service.clone();
    let tracking_service = startup.tracking_service.clone();
    let trusted_proxies = web::Data::new(startup.trusted_proxies.clone());

    let config = get_config();
    let cors_config = config.cors.clone();
    let cpu_count = config.server.cpu_count.clamp(1, 32);
    info!("Using {} worker threads", cpu_count);

    if config.api.trusted_proxies.is_empty() {
        info!("Client IP: auto-detect mode, private peers may forward X-Forwarded-For");
    } else {
        info!(
            "Client IP: trusted proxies configured: {:?}",
            config.api.trusted_proxies
        );
    }

    let bind_address = format!("{}:{}", config.server.host, config.server.port);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(build_cors_middleware(&cors_config))
            .app_data(web::Data::new(store.clone()))
            .app_data(web::Data::new(link_service.clone()))
            .app_data(web::Data::new(tracking_service.clone()))
            .app_data(trusted_proxies.clone())
            .app_data(web::Data::new(app_start_time.clone()))
            .configure(configure_routes)
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .workers(cpu_count)
    .disable_signals()
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run();

    warn!("Server listening on http://{}", bind_address);
    let handle = server.handle();

    tokio::select! {
        res = server => {
            res.context("HTTP server error")?;
        }
        _ = lifetime::shutdown::listen_for_shutdown() => {
            handle.stop(true).await;
            info!("HTTP server stopped");
        }
    }

    lifetime::shutdown::close_storage(&storage).await;
    Ok(())
}
