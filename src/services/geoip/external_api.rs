//! 外部 GeoIP API 实现
//!
//! 默认使用 ipapi.co（`https://ipapi.co/{ip}/json/`）
//! 内置 Moka 缓存 + Singleflight 语义，避免重复查询

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tracing::{trace, warn};
use ureq::Agent;

use super::provider::{GeoInfo, GeoIpLookup};

/// GeoIP 缓存 TTL（15 分钟）
const GEOIP_CACHE_TTL_SECS: u64 = 15 * 60;
/// GeoIP 缓存最大容量
const GEOIP_CACHE_MAX_CAPACITY: u64 = 10_000;

/// 外部 API GeoIP Provider
///
/// - LRU 淘汰策略，最大 10000 条
/// - TTL 15 分钟
/// - Singleflight：同一 IP 的并发请求只发一次 HTTP
/// - 失败结果（None）同样缓存，避免对故障服务反复请求
pub struct ExternalApiProvider {
    api_url_template: String,
    agent: Agent,
    cache: Cache<String, Option<GeoInfo>>,
}

impl ExternalApiProvider {
    /// `api_url_template` 使用 `{ip}` 作为占位符
    pub fn new(api_url_template: &str, timeout: Duration) -> Self {
        let cache = Cache::builder()
            .time_to_live(Duration::from_secs(GEOIP_CACHE_TTL_SECS))
            .max_capacity(GEOIP_CACHE_MAX_CAPACITY)
            .build();

        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();

        Self {
            api_url_template: api_url_template.to_string(),
            agent,
            cache,
        }
    }

    /// 解析 API 响应
    ///
    /// ipapi.co: `{"country": "US", "country_name": "United States", "city": ...,
    /// "region": ..., "latitude": 37.4, "longitude": -122.0}`，失败时 `{"error": true, ...}`；
    /// 同时兼容 ip-api.com 风格的 `{"status": "fail"}` / `lat` / `lon`。
    ///
    /// 国家优先取 `country`（ipapi.co 下是 ISO 代码，与客户端传入的格式一致），
    /// 缺失时才用 `country_name`。
    pub(crate) fn parse_response(json: &serde_json::Value) -> Option<GeoInfo> {
        if json["error"].as_bool() == Some(true) || json["status"].as_str() == Some("fail") {
            trace!("External API returned error payload");
            return None;
        }

        let text = |key: &str| {
            json[key]
                .as_str()
                .filter(|s| !s.is_empty())
                .map(String::from)
        };

        let country = text("country").or_else(|| text("country_name"));
        let city = text("city");
        let region = text("region").or_else(|| text("regionName"));
        let latitude = json["latitude"].as_f64().or_else(|| json["lat"].as_f64());
        let longitude = json["longitude"].as_f64().or_else(|| json["lon"].as_f64());

        if country.is_none() && city.is_none() && latitude.is_none() && longitude.is_none() {
            return None;
        }

        Some(GeoInfo {
            country,
            city,
            region,
            latitude,
            longitude,
        })
    }

    /// 同步请求（在 spawn_blocking 中调用）
    fn fetch_from_api_sync(agent: Agent, url: String) -> Option<GeoInfo> {
        let resp = match agent.get(&url).call() {
            Ok(r) => r,
            Err(e) => {
                warn!("GeoIP API request to \"{}\" failed: {}", url, e);
                return None;
            }
        };

        let json: serde_json::Value = match resp.into_body().read_json() {
            Ok(j) => j,
            Err(e) => {
                warn!("GeoIP API response from \"{}\" parse failed: {}", url, e);
                return None;
            }
        };

        let info = Self::parse_response(&json);
        trace!("External API lookup for {}: {:?}", url, info);
        info
    }

    async fn fetch_from_api(&self, ip: &str) -> Option<GeoInfo> {
        let url = self.api_url_template.replace("{ip}", ip);
        let agent = self.agent.clone();

        tokio::task::spawn_blocking(move || Self::fetch_from_api_sync(agent, url))
            .await
            .unwrap_or_else(|e| {
                warn!("GeoIP spawn_blocking failed: {}", e);
                None
            })
    }
}

#[async_trait]
impl GeoIpLookup for ExternalApiProvider {
    async fn lookup(&self, ip: &str) -> Option<GeoInfo> {
        self.cache
            .get_with(ip.to_string(), async {
                trace!("GeoIP cache miss for {}, fetching from API", ip);
                self.fetch_from_api(ip).await
            })
            .await
    }

    fn name(&self) -> &'static str {
        "ExternalAPI"
    }
}
