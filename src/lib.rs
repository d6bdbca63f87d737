//! Shrink - URL shortener with click analytics
//!
//! # Architecture
//! - `storage`: SeaORM record store (SQLite / MySQL / PostgreSQL)
//! - `services`: short code allocation, redirect tracking, GeoIP, User-Agent parsing
//! - `api`: HTTP handlers and routes
//! - `config`: static configuration (TOML + environment)
//! - `runtime`: application lifecycle and server mode
//! - `system`: logging
//! - `utils`: code generation, URL validation, client IP extraction

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
