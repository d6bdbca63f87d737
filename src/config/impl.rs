use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;

use super::StaticConfig;

static CONFIG: OnceLock<ArcSwap<StaticConfig>> = OnceLock::new();

/// Get the global configuration instance
///
/// Returns an Arc pointer to the configuration, which is cheap to clone
/// and doesn't hold any locks.
pub fn get_config() -> Arc<StaticConfig> {
    CONFIG
        .get()
        .expect("Config not initialized. Call init_config_from() first.")
        .load_full()
}

/// Initialize the global configuration with an explicit value
///
/// Used by the binary after applying CLI overrides.
/// Later calls replace the stored configuration.
pub fn init_config_from(config: StaticConfig) {
    let config = Arc::new(config);
    let slot = CONFIG.get_or_init(|| ArcSwap::new(Arc::clone(&config)));
    slot.store(config);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_config_from_replaces_previous_value() {
        let mut first = StaticConfig::default();
        first.server.port = 18080;
        init_config_from(first);
        assert_eq!(get_config().server.port, 18080);

        let mut second = StaticConfig::default();
        second.server.port = 18081;
        init_config_from(second);
        assert_eq!(get_config().server.port, 18081);
    }
}
