//! Service layer for business logic
//!
//! HTTP handlers stay thin and delegate to these services.

pub mod geoip;
mod link_service;
mod tracking_service;
pub mod user_agent;

pub use geoip::{GeoInfo, GeoIpLookup, GeoIpProvider};
pub use link_service::*;
pub use tracking_service::*;
