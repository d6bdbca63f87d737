//! HTTP API layer

pub mod services;

pub use services::configure_routes;
