//! GeoIP 服务模块
//!
//! 通过外部 HTTP API 查询 IP 地理位置，带缓存与超时

mod external_api;
mod provider;

pub use external_api::ExternalApiProvider;
pub use provider::{GeoInfo, GeoIpLookup, GeoIpProvider};
