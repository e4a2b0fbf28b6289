//! Configuration module.

pub mod loader;

pub use loader::{
    apply_cli_overrides, apply_env_overrides, default_config_path, default_log_path,
    load_config_file, load_config_with_precedence, merge_config, CliOverrides, ConfigError,
    ConfigFile, ResolvedConfig,
};

use std::time::Duration;

/// Maximum spine distance a cached view may be from the current item.
pub const DEFAULT_EVICTION_WINDOW: usize = 3;

/// Grace period between a new view reporting loaded and the request resolving,
/// letting layout settle before the caller proceeds.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(150);

/// Runtime knobs of the view cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewCacheConfig {
    /// Cached views further than this from the current spine index are evicted.
    pub eviction_window: usize,
    /// Delay after a new view loads before its request resolves.
    pub settle_delay: Duration,
    /// Give up waiting for a new view after this long. `None` waits forever.
    pub load_timeout: Option<Duration>,
}

impl Default for ViewCacheConfig {
    fn default() -> Self {
        Self {
            eviction_window: DEFAULT_EVICTION_WINDOW,
            settle_delay: DEFAULT_SETTLE_DELAY,
            load_timeout: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cache_config_uses_window_of_three() {
        let config = ViewCacheConfig::default();
        assert_eq!(config.eviction_window, 3);
    }

    #[test]
    fn default_cache_config_settles_for_150ms() {
        let config = ViewCacheConfig::default();
        assert_eq!(config.settle_delay, Duration::from_millis(150));
    }

    #[test]
    fn default_cache_config_has_no_load_timeout() {
        assert_eq!(ViewCacheConfig::default().load_timeout, None);
    }
}
