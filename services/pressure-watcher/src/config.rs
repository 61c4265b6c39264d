//! Configuration types for the pressure-watcher service

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

/// Upload API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cors_origins")]
    pub cors_allowed_origins: Vec<String>,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: default_server_port(),
            cors_allowed_origins: default_cors_origins(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

/// Reading store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_store_capacity")]
    pub capacity: usize,
    /// Keep the uploaded photo on the stored reading
    #[serde(default)]
    pub persist_images: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: default_store_capacity(),
            persist_images: false,
        }
    }
}

/// Dashboard configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_dashboard_port")]
    pub port: u16,
    #[serde(default = "default_history_size")]
    pub history_size: usize,
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_seconds: u64,
    #[serde(default)]
    pub source: FeedSource,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: default_dashboard_port(),
            history_size: default_history_size(),
            refresh_interval_seconds: default_refresh_interval(),
            source: FeedSource::default(),
        }
    }
}

/// Where the dashboard takes its readings from, tagged for extensibility
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FeedSource {
    /// The reading store of this process
    #[default]
    #[serde(rename = "local")]
    Local,
    /// Another pressure-watcher's `/api/readings`
    #[serde(rename = "remote")]
    Remote {
        base_url: String,
        #[serde(default = "default_polling_interval")]
        polling_interval_seconds: u64,
    },
}

fn default_true() -> bool {
    true
}

fn default_server_port() -> u16 {
    8080
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_store_capacity() -> usize {
    1000
}

fn default_dashboard_port() -> u16 {
    8081
}

fn default_history_size() -> usize {
    20
}

fn default_refresh_interval() -> u64 {
    5
}

fn default_polling_interval() -> u64 {
    5
}

/// Load configuration from a JSON file
pub fn load_config(path: &Path) -> crate::Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        crate::WatcherError::Config(format!("Failed to read config file {:?}: {}", path, e))
    })?;
    let config: Config = serde_json::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Reject values the service cannot run with
    pub fn validate(&self) -> crate::Result<()> {
        if self.dashboard.history_size == 0 {
            return Err(crate::WatcherError::Config(
                "dashboard.history_size must be at least 1".to_string(),
            ));
        }
        if self.store.capacity == 0 {
            return Err(crate::WatcherError::Config(
                "store.capacity must be at least 1".to_string(),
            ));
        }
        if let FeedSource::Remote {
            base_url,
            polling_interval_seconds,
        } = &self.dashboard.source
        {
            if base_url.trim().is_empty() {
                return Err(crate::WatcherError::Config(
                    "dashboard.source.base_url must not be empty".to_string(),
                ));
            }
            if *polling_interval_seconds == 0 {
                return Err(crate::WatcherError::Config(
                    "dashboard.source.polling_interval_seconds must be at least 1".to_string(),
                ));
            }
        }
        Ok(())
    }
}
