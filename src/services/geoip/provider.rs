//! GeoIP Provider 抽象层
//!
//! 查询是尽力而为的：超时、网络错误、响应格式错误都退化为空结果，
//! 不会影响调用方的主流程。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::external_api::ExternalApiProvider;
use crate::config::GeoIpConfig;
use crate::storage::Location;

/// 地理位置信息
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoInfo {
    pub country: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl From<GeoInfo> for Location {
    fn from(geo: GeoInfo) -> Self {
        Location {
            country: geo.country,
            city: geo.city,
            region: geo.region,
            latitude: geo.latitude,
            longitude: geo.longitude,
        }
    }
}

/// GeoIP 查询 trait
#[async_trait]
pub trait GeoIpLookup: Send + Sync {
    /// 查询 IP 地址的地理位置，失败返回 None
    async fn lookup(&self, ip: &str) -> Option<GeoInfo>;

    /// 获取 provider 名称（用于日志）
    fn name(&self) -> &'static str;
}

/// 统一 GeoIP Provider，负责超时控制
#[derive(Clone)]
pub struct GeoIpProvider {
    inner: Arc<dyn GeoIpLookup>,
    timeout: Duration,
}

impl GeoIpProvider {
    /// 根据配置初始化外部 API provider
    pub fn new(config: &GeoIpConfig) -> Self {
        let timeout = Duration::from_secs(config.timeout_secs.max(1));
        let inner: Arc<dyn GeoIpLookup> =
            Arc::new(ExternalApiProvider::new(&config.api_url, timeout));

        info!(
            "GeoIP: Initialized with {} provider (timeout {:?})",
            inner.name(),
            timeout
        );
        Self { inner, timeout }
    }

    /// 使用自定义实现（测试替身等）
    pub fn with_lookup(inner: Arc<dyn GeoIpLookup>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    /// 查询 IP 地址的地理位置；任何失败都返回空结果
    pub async fn lookup(&self, ip: &str) -> GeoInfo {
        match tokio::time::timeout(self.timeout, self.inner.lookup(ip)).await {
            Ok(Some(info)) => info,
            Ok(None) => {
                debug!("GeoIP: {} returned no result for {}", self.inner.name(), ip);
                GeoInfo::default()
            }
            Err(_) => {
                warn!(
                    "GeoIP: {} lookup for {} timed out after {:?}",
                    self.inner.name(),
                    ip,
                    self.timeout
                );
                GeoInfo::default()
            }
        }
    }

    /// 获取当前使用的 provider 名称
    pub fn provider_name(&self) -> &'static str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SlowLookup;

    #[async_trait]
    impl GeoIpLookup for SlowLookup {
        async fn lookup(&self, _ip: &str) -> Option<GeoInfo> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Some(GeoInfo {
                country: Some("Nowhere".to_string()),
                ..Default::default()
            })
        }

        fn name(&self) -> &'static str {
            "Slow"
        }
    }

    struct FailingLookup;

    #[async_trait]
    impl GeoIpLookup for FailingLookup {
        async fn lookup(&self, _ip: &str) -> Option<GeoInfo> {
            None
        }

        fn name(&self) -> &'static str {
            "Failing"
        }
    }

    #[tokio::test]
    async fn test_timeout_collapses_to_empty() {
        let provider = GeoIpProvider::with_lookup(Arc::new(SlowLookup), Duration::from_millis(20));
        assert_eq!(provider.lookup("8.8.8.8").await, GeoInfo::default());
    }

    #[tokio::test]
    async fn test_failure_collapses_to_empty() {
        let provider = GeoIpProvider::with_lookup(Arc::new(FailingLookup), Duration::from_secs(1));
        assert_eq!(provider.lookup("8.8.8.8").await, GeoInfo::default());
        assert_eq!(provider.provider_name(), "Failing");
    }

    #[test]
    fn test_geo_info_into_location() {
        let location: Location = GeoInfo {
            country: Some("France".to_string()),
            latitude: Some(48.85),
            longitude: Some(2.35),
            ..Default::default()
        }
        .into();
        assert_eq!(location.country.as_deref(), Some("France"));
        assert_eq!(location.latitude, Some(48.85));
        assert!(location.city.is_none());
    }
}
