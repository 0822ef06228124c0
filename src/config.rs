//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::aggregate::{DEFAULT_TOP_N, MIN_TRUSTED_TIMESTAMP};
use crate::export::DEFAULT_CSV_FILENAME;
use crate::page::PageSettings;
use crate::settings::FilePreferenceStore;
use crate::sources::HttpSourceConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sources: SourcesConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub dashboard: DashboardConfig,

    #[serde(default)]
    pub preferences: PreferencesConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Upstream data endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    #[serde(default = "default_protocols_url")]
    pub protocols_url: String,

    #[serde(default = "default_chart_url")]
    pub chart_url: String,

    #[serde(default = "default_config_url")]
    pub config_url: String,

    #[serde(default = "default_coingecko_url")]
    pub coingecko_url: String,

    #[serde(default = "default_source_timeout")]
    pub request_timeout_ms: u64,
}

fn default_protocols_url() -> String {
    HttpSourceConfig::default().protocols_url
}

fn default_chart_url() -> String {
    HttpSourceConfig::default().chart_url
}

fn default_config_url() -> String {
    HttpSourceConfig::default().config_url
}

fn default_coingecko_url() -> String {
    HttpSourceConfig::default().coingecko_url
}

fn default_source_timeout() -> u64 {
    HttpSourceConfig::default().request_timeout_ms
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            protocols_url: default_protocols_url(),
            chart_url: default_chart_url(),
            config_url: default_config_url(),
            coingecko_url: default_coingecko_url(),
            request_timeout_ms: default_source_timeout(),
        }
    }
}

impl SourcesConfig {
    /// Client settings for [`crate::sources::HttpDataSource`]
    pub fn to_source_config(&self) -> HttpSourceConfig {
        HttpSourceConfig {
            protocols_url: self.protocols_url.clone(),
            chart_url: self.chart_url.clone(),
            config_url: self.config_url.clone(),
            coingecko_url: self.coingecko_url.clone(),
            request_timeout_ms: self.request_timeout_ms,
        }
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Seconds a built page is served before the next request rebuilds it
    #[serde(default = "default_revalidate_secs")]
    pub revalidate_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8090
}

fn default_revalidate_secs() -> u64 {
    300 // 5 minutes
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
            revalidate_secs: default_revalidate_secs(),
        }
    }
}

/// Chains page tunables
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    #[serde(default = "default_min_timestamp")]
    pub min_timestamp: i64,

    #[serde(default = "default_csv_filename")]
    pub csv_filename: String,
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

fn default_min_timestamp() -> i64 {
    MIN_TRUSTED_TIMESTAMP
}

fn default_csv_filename() -> String {
    DEFAULT_CSV_FILENAME.to_string()
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            min_timestamp: default_min_timestamp(),
            csv_filename: default_csv_filename(),
        }
    }
}

impl DashboardConfig {
    pub fn page_settings(&self) -> PageSettings {
        PageSettings {
            top_n: self.top_n,
            min_timestamp: self.min_timestamp,
        }
    }
}

/// Display preference storage
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreferencesConfig {
    /// Preference file, defaults to the user's config directory
    pub path: Option<String>,
}

impl PreferencesConfig {
    pub fn resolved_path(&self) -> PathBuf {
        self.path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(FilePreferenceStore::default_path)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("chaintvl").join("config.toml")),
            Some(PathBuf::from("/etc/chaintvl/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Source overrides
        if let Some(url) = var("CHAINTVL_PROTOCOLS_URL") {
            self.sources.protocols_url = url;
        }
        if let Some(url) = var("CHAINTVL_CHART_URL") {
            self.sources.chart_url = url;
        }
        if let Some(url) = var("CHAINTVL_CONFIG_URL") {
            self.sources.config_url = url;
        }
        if let Some(url) = var("CHAINTVL_COINGECKO_URL") {
            self.sources.coingecko_url = url;
        }

        // API overrides
        if let Some(host) = var("CHAINTVL_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = var("CHAINTVL_API_PORT") {
            if let Ok(p) = port.parse() {
                self.api.port = p;
            }
        }
        if let Some(secs) = var("CHAINTVL_REVALIDATE_SECS") {
            if let Ok(s) = secs.parse() {
                self.api.revalidate_secs = s;
            }
        }

        // Logging overrides
        if let Some(level) = var("CHAINTVL_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("CHAINTVL_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Chain TVL Dashboard Configuration
#
# Environment variables override these settings:
# - CHAINTVL_PROTOCOLS_URL
# - CHAINTVL_CHART_URL
# - CHAINTVL_CONFIG_URL
# - CHAINTVL_COINGECKO_URL
# - CHAINTVL_API_HOST
# - CHAINTVL_API_PORT
# - CHAINTVL_REVALIDATE_SECS
# - CHAINTVL_LOG_LEVEL
# - CHAINTVL_LOG_FORMAT

[sources]
# Protocol list with chain membership and per-chain TVL
protocols_url = "https://api.llama.fi/lite/protocols2"

# Per-chain TVL history; the chain name is appended
chart_url = "https://api.llama.fi/lite/charts"

# Chain -> CoinGecko id mapping
config_url = "https://api.llama.fi/config"

# Market-cap lookup
coingecko_url = "https://api.coingecko.com/api/v3"

# Request timeout (ms)
request_timeout_ms = 30000

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 8090

# Allowed CORS origins
cors_origins = ["http://localhost:3000", "http://127.0.0.1:3000"]

# Seconds before a cached page is rebuilt
revalidate_secs = 300

[dashboard]
# Chains shown individually in the pie chart
top_n = 10

# Points before this unix timestamp are ignored
min_timestamp = 1596248105

# Name of the CSV download
csv_filename = "chains.csv"

[preferences]
# Display preference file
# path = "~/.config/chaintvl/preferences.json"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
