//! Configuration file (`config.toml`)
//!
//! ```toml
//! host = "https://graph.microsoft.com"
//! api_version = "v1.0"
//! timeout_secs = 300
//!
//! [headers]
//! Authorization = "Bearer ..."
//!
//! [reconcile]
//! ignore_missing_property = false
//! ignore_casing = true
//! ```

use anyhow::{Context, Result, bail};
use graphkit::transport::http::{DEFAULT_HOST, HttpTransport};
use graphkit::{Client, DEFAULT_API_VERSION, RequestOptions, validate_api_version};
use reconcile::UpdateOptions;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::paths;

/// Config file name inside the config directory
pub const CONFIG_FILE: &str = "config.toml";

/// Default per-operation deadline
const DEFAULT_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API host, without version segment
    pub host: String,
    /// API version: v1.0 or beta
    pub api_version: String,
    /// Deadline for one command's requests
    pub timeout_secs: u64,
    /// Headers sent with every request
    pub headers: BTreeMap<String, String>,
    /// Default reconciliation options
    pub reconcile: UpdateOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            headers: BTreeMap::new(),
            reconcile: UpdateOptions::default(),
        }
    }
}

impl Config {
    /// Path of the config file
    pub fn path() -> Result<PathBuf> {
        Ok(paths::config_dir()?.join(CONFIG_FILE))
    }

    /// Load the config file, falling back to defaults when it is missing
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load a specific config file
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid config format in {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save to a specific path, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).context("Could not serialize config")?;
        fs::write(path, content).with_context(|| format!("Could not write {}", path.display()))?;
        Ok(())
    }

    /// Check values the API would reject
    pub fn validate(&self) -> Result<()> {
        if !(self.host.starts_with("https://") || self.host.starts_with("http://")) {
            bail!("host must start with https:// or http://, got '{}'", self.host);
        }
        validate_api_version(&self.api_version)?;
        if self.timeout_secs == 0 {
            bail!("timeout_secs must be greater than zero");
        }
        Ok(())
    }

    /// Apply command-line overrides
    pub fn with_overrides(mut self, host: Option<String>, api_version: Option<String>) -> Result<Self> {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(api_version) = api_version {
            self.api_version = api_version;
        }
        self.validate()?;
        Ok(self)
    }

    /// Build an HTTPS client from this config
    pub fn client(&self) -> Result<Client> {
        let transport = HttpTransport::new(&self.host).with_headers(self.headers.clone());
        Ok(Client::with_transport(Box::new(transport)).with_api_version(&self.api_version)?)
    }

    /// Request options carrying the configured deadline
    pub fn request_options(&self) -> RequestOptions {
        RequestOptions::new().timeout(Duration::from_secs(self.timeout_secs))
    }
}
