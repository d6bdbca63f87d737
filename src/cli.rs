//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

use crate::config::StaticConfig;

/// Shrink - URL shortener with click analytics
#[derive(Parser, Debug)]
#[command(name = "shrink")]
#[command(version)]
#[command(about = "URL shortener with click analytics", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file (default: ./config.toml, optional)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    /// Override the listen port
    #[arg(long, short = 'p', global = true)]
    pub port: Option<u16>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the HTTP server (default)
    Serve,
    /// Print the effective configuration as TOML and exit
    PrintConfig,
}

impl Cli {
    /// Load static configuration and apply command-line overrides
    pub fn load_config(&self) -> StaticConfig {
        let mut config = StaticConfig::load(self.config.as_deref());
        if let Some(port) = self.port {
            config.server.port = port;
        }
        config
    }
}
