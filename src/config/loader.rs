//! Configuration file loading with precedence handling.

use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;
use tracing::warn;

use crate::codec::parsers::FreeTextPolicy;
use crate::model::view_state::DEFAULT_PER_PAGE;
use crate::state::controller::ControllerOptions;
use crate::state::debounce::DEFAULT_FILTER_DEBOUNCE_MS;
use crate::state::history::{HistoryMode, WriteOptions};
use crate::state::query_cache::DEFAULT_CACHE_CAPACITY;
use crate::state::search_params::{SearchParamsOptions, DEFAULT_THROTTLE_MS};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "TABLESYNC_CONFIG";
/// Environment variable overriding the default page size.
pub const PER_PAGE_ENV: &str = "TABLESYNC_PER_PAGE";
/// Environment variable overriding push/replace (`push` or `replace`).
pub const HISTORY_ENV: &str = "TABLESYNC_HISTORY";

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

    /// Config file contains invalid TOML syntax.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/tablesync/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Page size when neither the URL nor the initial state names one.
    #[serde(default)]
    pub per_page: Option<u32>,

    /// Quiet period before a filter edit is committed.
    #[serde(default)]
    pub filter_debounce_ms: Option<u64>,

    /// Minimum interval between URL writes.
    #[serde(default)]
    pub throttle_ms: Option<u64>,

    /// Debounce URL writes instead of throttling them.
    #[serde(default)]
    pub url_debounce_ms: Option<u64>,

    /// `push` or `replace`.
    #[serde(default)]
    pub history: Option<HistoryMode>,

    /// Shallow URL updates.
    #[serde(default)]
    pub shallow: Option<bool>,

    /// Scroll to top after a URL update.
    #[serde(default)]
    pub scroll: Option<bool>,

    /// Remove parameters that equal their default.
    #[serde(default)]
    pub clear_on_default: Option<bool>,

    /// `opaque` or `split-on-delimiters`.
    #[serde(default)]
    pub free_text_policy: Option<FreeTextPolicy>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Default page size.
    pub per_page: u32,
    /// Filter debounce.
    pub filter_debounce_ms: u64,
    /// URL write throttle.
    pub throttle_ms: u64,
    /// URL write debounce, replacing the throttle when set.
    pub url_debounce_ms: Option<u64>,
    /// Push or replace.
    pub history: HistoryMode,
    /// Shallow updates.
    pub shallow: bool,
    /// Scroll after update.
    pub scroll: bool,
    /// Default omission.
    pub clear_on_default: bool,
    /// Free-text restore policy.
    pub free_text_policy: FreeTextPolicy,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        let write = WriteOptions::default();
        Self {
            per_page: DEFAULT_PER_PAGE,
            filter_debounce_ms: DEFAULT_FILTER_DEBOUNCE_MS,
            throttle_ms: DEFAULT_THROTTLE_MS,
            url_debounce_ms: None,
            history: write.history,
            shallow: write.shallow,
            scroll: write.scroll,
            clear_on_default: false,
            free_text_policy: FreeTextPolicy::default(),
            log_file_path: default_log_path(),
        }
    }
}

impl ResolvedConfig {
    /// Options shared by both controller modes.
    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            per_page: self.per_page,
            filter_debounce_ms: self.filter_debounce_ms,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }

    /// URL write behavior for search-params mode.
    pub fn search_params_options(&self) -> SearchParamsOptions {
        SearchParamsOptions {
            write: WriteOptions {
                history: self.history,
                shallow: self.shallow,
                scroll: self.scroll,
            },
            throttle_ms: self.throttle_ms,
            debounce_ms: self.url_debounce_ms,
            clear_on_default: self.clear_on_default,
            free_text_policy: self.free_text_policy,
        }
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/tablesync/tablesync.log` on Unix-like systems,
/// or appropriate platform path on other systems.
///
/// If state directory cannot be determined, falls back to current directory.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("tablesync").join("tablesync.log")
    } else {
        PathBuf::from("tablesync.log")
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
/// Returns `~/.config/tablesync/config.toml` on Unix, appropriate path on other platforms.
/// Returns `None` if home directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tablesync").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `TABLESYNC_CONFIG` environment variable
/// 3. Default path `~/.config/tablesync/config.toml`
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

    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Apply environment variable overrides to resolved config.
///
/// Checks `TABLESYNC_PER_PAGE` (positive integer) and `TABLESYNC_HISTORY`
/// (`push` / `replace`). Unparseable values are logged and ignored.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Ok(raw) = std::env::var(PER_PAGE_ENV) {
        match raw.trim().parse::<u32>() {
            Ok(n) if n > 0 => config.per_page = n,
            _ => warn!(value = %raw, "Ignoring invalid TABLESYNC_PER_PAGE"),
        }
    }

    if let Ok(raw) = std::env::var(HISTORY_ENV) {
        match raw.trim().to_ascii_lowercase().as_str() {
            "push" => config.history = HistoryMode::Push,
            "replace" => config.history = HistoryMode::Replace,
            _ => warn!(value = %raw, "Ignoring invalid TABLESYNC_HISTORY"),
        }
    }

    config
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
        per_page: config
            .per_page
            .filter(|n| *n > 0)
            .unwrap_or(defaults.per_page),
        filter_debounce_ms: config
            .filter_debounce_ms
            .unwrap_or(defaults.filter_debounce_ms),
        throttle_ms: config.throttle_ms.unwrap_or(defaults.throttle_ms),
        url_debounce_ms: config.url_debounce_ms.or(defaults.url_debounce_ms),
        history: config.history.unwrap_or(defaults.history),
        shallow: config.shallow.unwrap_or(defaults.shallow),
        scroll: config.scroll.unwrap_or(defaults.scroll),
        clear_on_default: config.clear_on_default.unwrap_or(defaults.clear_on_default),
        free_text_policy: config.free_text_policy.unwrap_or(defaults.free_text_policy),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

/// Apply CLI argument overrides to resolved config.
///
/// Only applies overrides for flags that were explicitly set by the user.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    history_override: Option<HistoryMode>,
    clear_on_default_override: Option<bool>,
) -> ResolvedConfig {
    if let Some(history) = history_override {
        config.history = history;
    }

    if let Some(clear) = clear_on_default_override {
        config.clear_on_default = clear;
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
