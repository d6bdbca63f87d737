//! Redirect resolution and click tracking
//!
//! 主查询失败会中止请求；点击记录是次要写入，失败只记录日志，
//! 结果通过 [`RedirectOutcome::tracking`] 单独返回，从不影响跳转。

use std::net::IpAddr;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use super::geoip::GeoIpProvider;
use super::user_agent::parse_user_agent;
use crate::errors::{Result, ShrinkError};
use crate::storage::{ClickEvent, Location, NewClickEvent, UrlStore};
use crate::utils::ip::parse_ip;

/// 本地访问时写入的占位位置
pub const LOCAL_COUNTRY: &str = "Local";
pub const LOCAL_CITY: &str = "Testing";
pub const LOCAL_REGION: &str = "Dev";

/// 浏览器端提供的位置（Geolocation API）
#[derive(Debug, Clone, PartialEq)]
pub struct ClientLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub country: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
}

impl ClientLocation {
    /// 只有 lat 和 lng 都是有限浮点数时才算有效坐标
    pub fn from_parts(
        lat: Option<&str>,
        lng: Option<&str>,
        country: Option<&str>,
        city: Option<&str>,
        region: Option<&str>,
    ) -> Option<Self> {
        let latitude = lat?.trim().parse::<f64>().ok().filter(|v| v.is_finite())?;
        let longitude = lng?.trim().parse::<f64>().ok().filter(|v| v.is_finite())?;

        let text = |v: Option<&str>| v.filter(|s| !s.is_empty()).map(String::from);

        Some(Self {
            latitude,
            longitude,
            country: text(country),
            city: text(city),
            region: text(region),
        })
    }
}

impl From<ClientLocation> for Location {
    fn from(loc: ClientLocation) -> Self {
        Location {
            country: loc.country,
            city: loc.city,
            region: loc.region,
            latitude: Some(loc.latitude),
            longitude: Some(loc.longitude),
        }
    }
}

/// 一次访问的请求上下文
#[derive(Debug, Clone, Default)]
pub struct ClickContext {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub client_location: Option<ClientLocation>,
}

/// 跳转结果：目标地址 + 独立的点击记录结果
#[derive(Debug)]
pub struct RedirectOutcome {
    pub destination: String,
    pub tracking: Result<ClickEvent>,
}

fn local_placeholder() -> Location {
    Location {
        country: Some(LOCAL_COUNTRY.to_string()),
        city: Some(LOCAL_CITY.to_string()),
        region: Some(LOCAL_REGION.to_string()),
        latitude: None,
        longitude: None,
    }
}

fn is_loopback(ip: &IpAddr) -> bool {
    ip.to_canonical().is_loopback()
}

/// Redirect / tracking handler
#[derive(Clone)]
pub struct TrackingService {
    store: Arc<dyn UrlStore>,
    /// None 表示禁用 IP 地理位置查询
    geoip: Option<GeoIpProvider>,
}

impl TrackingService {
    pub fn new(store: Arc<dyn UrlStore>, geoip: Option<GeoIpProvider>) -> Self {
        Self { store, geoip }
    }

    /// 按优先级解析位置：客户端坐标 > IP 查询（非 loopback）> 本地占位
    pub async fn resolve_location(&self, ctx: &ClickContext) -> Location {
        if let Some(client) = &ctx.client_location {
            return client.clone().into();
        }

        let Some(ip) = ctx.ip.as_deref().and_then(parse_ip) else {
            debug!("No usable client IP ({:?}), skipping geolocation", ctx.ip);
            return Location::default();
        };

        if is_loopback(&ip) {
            return local_placeholder();
        }

        match &self.geoip {
            Some(geoip) => geoip.lookup(&ip.to_string()).await.into(),
            None => Location::default(),
        }
    }

    /// 构建点击事件
    pub async fn build_click(&self, ctx: &ClickContext) -> NewClickEvent {
        let mut location = self.resolve_location(ctx).await;
        let mut client = ctx
            .user_agent
            .as_deref()
            .map(parse_user_agent)
            .unwrap_or_default();

        // 客户端传入的文本不受信任，超出列宽会导致整条点击写入失败
        location.clamp_to_columns();
        client.clamp_to_columns();

        NewClickEvent {
            timestamp: Utc::now(),
            ip: ctx.ip.clone(),
            user_agent: ctx.user_agent.clone(),
            referrer: ctx.referrer.clone(),
            location,
            client,
        }
    }

    /// 处理一次跳转
    ///
    /// 记录不存在时返回 `NotFound`；一旦找到记录，无论点击追加成功与否都返回目标地址。
    pub async fn redirect(&self, code: &str, ctx: ClickContext) -> Result<RedirectOutcome> {
        let record = self
            .store
            .find_by_short_url(code, false)
            .await?
            .ok_or_else(|| ShrinkError::not_found("Short URL not found"))?;

        let click = self.build_click(&ctx).await;
        let tracking = self.store.append_click(code, click).await;

        match &tracking {
            Ok(event) => debug!("Recorded click {} for '{}'", event.id, code),
            Err(e) => warn!("Click tracking failed for '{}': {}", code, e),
        }

        Ok(RedirectOutcome {
            destination: record.original_url,
            tracking,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_location_requires_both_coordinates() {
        assert!(ClientLocation::from_parts(Some("1.5"), None, None, None, None).is_none());
        assert!(ClientLocation::from_parts(None, Some("1.5"), None, None, None).is_none());
        assert!(ClientLocation::from_parts(Some("abc"), Some("1.5"), None, None, None).is_none());
        assert!(ClientLocation::from_parts(Some("NaN"), Some("1.5"), None, None, None).is_none());
        assert!(ClientLocation::from_parts(Some("inf"), Some("1.5"), None, None, None).is_none());
    }

    #[test]
    fn test_client_location_keeps_values_verbatim() {
        let loc = ClientLocation::from_parts(
            Some("40.7128"),
            Some("-74.0060"),
            Some("US"),
            Some(""),
            Some("NY"),
        )
        .unwrap();

        assert_eq!(loc.latitude, 40.7128);
        assert_eq!(loc.longitude, -74.0060);
        assert_eq!(loc.country.as_deref(), Some("US"));
        assert!(loc.city.is_none());
        assert_eq!(loc.region.as_deref(), Some("NY"));
    }

    #[test]
    fn test_loopback_detection() {
        assert!(is_loopback(&"127.0.0.1".parse().unwrap()));
        assert!(is_loopback(&"127.8.9.10".parse().unwrap()));
        assert!(is_loopback(&"::1".parse().unwrap()));
        assert!(is_loopback(&"::ffff:127.0.0.1".parse().unwrap()));
        assert!(!is_loopback(&"10.0.0.1".parse().unwrap()));
        assert!(!is_loopback(&"8.8.8.8".parse().unwrap()));
    }
}
