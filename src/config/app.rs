//! Application configuration loading from config.toml
//!
//! The file describes the HTTP client settings and which stores are enabled.
//! Store order in the file is the registration order the coordinator uses.
//! Every field is optional; a missing file means "both retailers, default settings".

use crate::core::retailers::{Retailer, StoreKind};
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Browser User-Agent sent with every product page request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.3";

/// Per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// HTTP client settings
    #[serde(default)]
    pub http: HttpSettings,
    /// Enabled stores, in registration order
    #[serde(default = "default_stores")]
    pub stores: Vec<StoreConfig>,
}

/// HTTP client settings shared by every store
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct HttpSettings {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Configuration for a single store
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Store identifier, one of the supported retailers
    pub id: String,
    /// Overrides the retailer's product URL prefix
    #[serde(default)]
    pub base_url: Option<String>,
    /// Overrides the script-tag marker the embedded JSON follows
    #[serde(default)]
    pub marker: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http: HttpSettings::default(),
            stores: default_stores(),
        }
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl StoreConfig {
    /// Builds the retailer this entry describes.
    ///
    /// # Errors
    /// Returns `Error::UnsupportedStore` if `id` is not a known retailer.
    pub fn build_retailer(&self) -> Result<Box<dyn Retailer>> {
        let kind: StoreKind = self.id.parse()?;
        Ok(kind.build(self.base_url.clone(), self.marker.clone()))
    }
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_stores() -> Vec<StoreConfig> {
    StoreKind::ALL
        .iter()
        .map(|kind| StoreConfig {
            id: kind.as_str().to_string(),
            base_url: None,
            marker: None,
        })
        .collect()
}

/// Loads application configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    debug!("Loading configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {path_ref:?}: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse TOML from config file {path_ref:?}: {e}"),
    })
}

/// Loads configuration from `path`, falling back to the built-in defaults when
/// the file does not exist. A file that exists but fails to parse is an error.
pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    if path_ref.exists() {
        load_config(path_ref)
    } else {
        info!("No config file at {:?}, using defaults", path_ref);
        Ok(AppConfig::default())
    }
}
