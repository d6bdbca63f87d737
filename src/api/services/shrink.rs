use actix_web::{HttpResponse, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::errors::ShrinkError;
use crate::services::{CreateLinkRequest, LinkService};
use crate::storage::UrlRecord;

/// POST /shrink 请求体
#[derive(Debug, Deserialize)]
pub struct ShrinkRequest {
    pub original_url: String,
    #[serde(default)]
    pub custom_alias: Option<String>,
}

/// 创建成功的响应
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedLinkResponse {
    pub id: i64,
    pub original_url: String,
    pub short_url: String,
    pub total_clicks: u64,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

impl From<UrlRecord> for CreatedLinkResponse {
    fn from(record: UrlRecord) -> Self {
        Self {
            id: record.id,
            original_url: record.original_url,
            short_url: record.short_url,
            total_clicks: record.total_clicks,
            created_at: record.created_at,
            is_active: record.is_active,
        }
    }
}

pub struct ShrinkService;

impl ShrinkService {
    pub async fn create(
        body: web::Json<ShrinkRequest>,
        links: web::Data<LinkService>,
    ) -> Result<HttpResponse, ShrinkError> {
        let body = body.into_inner();
        trace!("Shrink request for {}", body.original_url);

        let record = links
            .create_link(CreateLinkRequest {
                original_url: body.original_url,
                custom_alias: body.custom_alias,
            })
            .await?;

        Ok(HttpResponse::Created().json(CreatedLinkResponse::from(record)))
    }
}

/// 请求体解析失败统一返回 400 + JSON 错误
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(|err, _req| {
            ShrinkError::validation(format!("Invalid request: {}", err)).into()
        })
}

pub fn shrink_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/shrink", web::post().to(ShrinkService::create))
        .route("/api/shrink", web::post().to(ShrinkService::create));
}
