//! Configuration file loading with precedence handling.

use crate::config::{ViewCacheConfig, DEFAULT_EVICTION_WINDOW, DEFAULT_SETTLE_DELAY};
use crate::model::{ScrollMode, ViewerSettings};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "SPINEVIEW_CONFIG";

/// Environment variable overriding the settle delay, in milliseconds.
pub const SETTLE_DELAY_ENV_VAR: &str = "SPINEVIEW_SETTLE_DELAY_MS";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read config file (file may not exist or have permission issues).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax or unknown keys.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },

    /// An override environment variable holds an unusable value.
    #[error("Invalid value {value:?} for {var}")]
    InvalidEnvValue {
        /// Variable name.
        var: &'static str,
        /// Raw value found.
        value: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/spineview/config.toml`:
///
/// ```toml
/// eviction_window = 3
/// settle_delay_ms = 150
/// load_timeout_ms = 5000
///
/// [viewer]
/// scroll = "auto"
/// font_size = 100
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Spine distance beyond which cached views are evicted.
    #[serde(default)]
    pub eviction_window: Option<usize>,

    /// Settle delay after a new view loads, in milliseconds.
    #[serde(default)]
    pub settle_delay_ms: Option<u64>,

    /// Timeout for a new view to load, in milliseconds.
    #[serde(default)]
    pub load_timeout_ms: Option<u64>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,

    /// Default viewer settings.
    #[serde(default)]
    pub viewer: Option<ViewerSettings>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Eviction window.
    pub eviction_window: usize,
    /// Settle delay in milliseconds.
    pub settle_delay_ms: u64,
    /// Load timeout in milliseconds, if any.
    pub load_timeout_ms: Option<u64>,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
    /// Default viewer settings.
    pub viewer: ViewerSettings,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            eviction_window: DEFAULT_EVICTION_WINDOW,
            settle_delay_ms: DEFAULT_SETTLE_DELAY.as_millis() as u64,
            load_timeout_ms: None,
            log_file_path: default_log_path(),
            viewer: ViewerSettings::default(),
        }
    }
}

impl ResolvedConfig {
    /// Runtime cache knobs derived from this configuration.
    pub fn view_cache(&self) -> ViewCacheConfig {
        ViewCacheConfig {
            eviction_window: self.eviction_window,
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            load_timeout: self.load_timeout_ms.map(Duration::from_millis),
        }
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/spineview/spineview.log` on Linux, the platform
/// equivalent elsewhere, or `spineview.log` in the current directory when no
/// state directory is known.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("spineview").join("spineview.log")
    } else {
        PathBuf::from("spineview.log")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    // Missing file is not an error - use defaults
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/spineview/config.toml` on Linux, the platform equivalent
/// elsewhere, or `None` if no config directory is known.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("spineview").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `SPINEVIEW_CONFIG` environment variable
/// 3. Default path `~/.config/spineview/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        eviction_window: config.eviction_window.unwrap_or(defaults.eviction_window),
        settle_delay_ms: config.settle_delay_ms.unwrap_or(defaults.settle_delay_ms),
        load_timeout_ms: config.load_timeout_ms.or(defaults.load_timeout_ms),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
        viewer: config.viewer.unwrap_or(defaults.viewer),
    }
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for `SPINEVIEW_SETTLE_DELAY_MS`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvValue`] if the variable is set but is not a
/// whole number of milliseconds.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> Result<ResolvedConfig, ConfigError> {
    if let Ok(raw) = std::env::var(SETTLE_DELAY_ENV_VAR) {
        config.settle_delay_ms =
            raw.trim()
                .parse()
                .map_err(|_| ConfigError::InvalidEnvValue {
                    var: SETTLE_DELAY_ENV_VAR,
                    value: raw.clone(),
                })?;
    }

    Ok(config)
}

/// Overrides explicitly set on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    /// `--window`
    pub eviction_window: Option<usize>,
    /// `--settle-ms`
    pub settle_delay_ms: Option<u64>,
    /// `--timeout-ms`
    pub load_timeout_ms: Option<u64>,
    /// `--scroll`
    pub scroll: Option<ScrollMode>,
}

/// Apply CLI argument overrides to resolved config.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(mut config: ResolvedConfig, overrides: CliOverrides) -> ResolvedConfig {
    if let Some(window) = overrides.eviction_window {
        config.eviction_window = window;
    }

    if let Some(delay) = overrides.settle_delay_ms {
        config.settle_delay_ms = delay;
    }

    if let Some(timeout) = overrides.load_timeout_ms {
        config.load_timeout_ms = Some(timeout);
    }

    if let Some(scroll) = overrides.scroll {
        config.viewer.scroll = scroll;
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
