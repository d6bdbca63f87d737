use actix_web::{HttpResponse, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ShrinkError;
use crate::services::LinkService;
use crate::storage::{ClickEvent, UrlRecord};

/// GET /info/{shortUrl} 响应
#[derive(Debug, Serialize, Deserialize)]
pub struct InfoResponse {
    pub id: i64,
    pub original_url: String,
    pub short_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_alias: Option<String>,
    pub total_clicks: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_active: bool,
    pub clicks_count: usize,
    pub clicks: Vec<ClickEvent>,
}

impl From<UrlRecord> for InfoResponse {
    fn from(record: UrlRecord) -> Self {
        Self {
            id: record.id,
            original_url: record.original_url,
            short_url: record.short_url,
            custom_alias: record.custom_alias,
            total_clicks: record.total_clicks,
            created_at: record.created_at,
            updated_at: record.updated_at,
            is_active: record.is_active,
            clicks_count: record.clicks.len(),
            clicks: record.clicks,
        }
    }
}

/// GET /stats/{shortUrl} 响应
#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub id: i64,
    pub original_url: String,
    pub short_url: String,
    pub total_clicks: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_active: bool,
    pub clicks: Vec<ClickEvent>,
}

impl From<UrlRecord> for StatsResponse {
    fn from(record: UrlRecord) -> Self {
        Self {
            id: record.id,
            original_url: record.original_url,
            short_url: record.short_url,
            total_clicks: record.total_clicks,
            created_at: record.created_at,
            updated_at: record.updated_at,
            is_active: record.is_active,
            clicks: record.clicks,
        }
    }
}

pub struct InfoService;

impl InfoService {
    pub async fn info(
        path: web::Path<String>,
        links: web::Data<LinkService>,
    ) -> Result<HttpResponse, ShrinkError> {
        let record = links.get_link(&path.into_inner(), true).await?;
        Ok(HttpResponse::Ok().json(InfoResponse::from(record)))
    }

    pub async fn stats(
        path: web::Path<String>,
        links: web::Data<LinkService>,
    ) -> Result<HttpResponse, ShrinkError> {
        let record = links.get_link(&path.into_inner(), true).await?;
        Ok(HttpResponse::Ok().json(StatsResponse::from(record)))
    }
}

pub fn info_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/info/{shortUrl}", web::get().to(InfoService::info))
        .route("/info/{shortUrl}", web::head().to(InfoService::info))
        .route("/stats/{shortUrl}", web::get().to(InfoService::stats))
        .route("/stats/{shortUrl}", web::head().to(InfoService::stats))
        .route("/api/stats/{shortUrl}", web::get().to(InfoService::stats))
        .route("/api/stats/{shortUrl}", web::head().to(InfoService::stats));
}
