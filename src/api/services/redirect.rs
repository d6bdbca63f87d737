use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;
use tracing::{debug, trace};

use crate::errors::ShrinkError;
use crate::services::{ClickContext, ClientLocation, TrackingService};
use crate::utils::ip::{TrustedProxies, extract_client_ip};

/// 浏览器端 Geolocation 通过 query 传入的位置
#[derive(Debug, Default, Deserialize)]
pub struct LocationQuery {
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
}

impl LocationQuery {
    pub fn client_location(&self) -> Option<ClientLocation> {
        ClientLocation::from_parts(
            self.lat.as_deref(),
            self.lng.as_deref(),
            self.country.as_deref(),
            self.city.as_deref(),
            self.region.as_deref(),
        )
    }
}

fn header_value(req: &HttpRequest, name: header::HeaderName) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|h| h.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(String::from)
}

pub struct RedirectService;

impl RedirectService {
    pub async fn handle_redirect(
        req: HttpRequest,
        path: web::Path<String>,
        query: Result<web::Query<LocationQuery>, actix_web::Error>,
        tracking: web::Data<TrackingService>,
        proxies: web::Data<TrustedProxies>,
    ) -> Result<HttpResponse, ShrinkError> {
        let code = path.into_inner();
        trace!("Redirect request for {}", code);

        // 位置参数只是附加信息，解析失败不能影响跳转
        let query = query.map(web::Query::into_inner).unwrap_or_else(|e| {
            debug!("Ignoring malformed location query for {}: {}", code, e);
            LocationQuery::default()
        });

        let ctx = ClickContext {
            ip: extract_client_ip(&req, &proxies),
            user_agent: header_value(&req, header::USER_AGENT),
            referrer: header_value(&req, header::REFERER),
            client_location: query.client_location(),
        };

        let outcome = tracking.redirect(&code, ctx).await?;

        Ok(HttpResponse::MovedPermanently()
            .insert_header((header::LOCATION, outcome.destination))
            .finish())
    }
}

/// 必须最后注册，避免吞掉其它路由
pub fn redirect_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/{shortUrl}", web::get().to(RedirectService::handle_redirect))
        .route("/{shortUrl}", web::head().to(RedirectService::handle_redirect));
}
