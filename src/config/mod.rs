//! Configuration management
//!
//! Static configuration is loaded once at startup from an optional TOML file
//! and environment variables, then shared through [`get_config`].

mod r#impl;
mod structs;

pub use r#impl::{get_config, init_config_from};
pub use structs::*;
