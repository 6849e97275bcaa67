//! Configuration management for the Ecko client
//!
//! This module handles loading, parsing, and validating configuration
//! from the YAML config file, environment variables, and CLI overrides.

use crate::cli::Cli;
use crate::error::{EckoError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Placeholder token shipped in the default config
///
/// A deployment pipeline is expected to replace this with the real backend
/// URL. While it is still in place every call fails closed with a
/// configuration error instead of reaching the network.
pub const BACKEND_URL_PLACEHOLDER: &str = "YOUR_BACKEND_URL_HERE";

/// Main configuration structure for the Ecko client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend connection settings
    #[serde(default)]
    pub backend: BackendConfig,

    /// Client behavior settings
    #[serde(default)]
    pub client: ClientConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            client: ClientConfig::default(),
        }
    }
}

/// Backend connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the Ecko backend
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Timeout for backend requests (seconds)
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    BACKEND_URL_PLACEHOLDER.to_string()
}

fn default_timeout() -> u64 {
    60
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl BackendConfig {
    /// Whether a usable backend URL has been configured
    ///
    /// Returns false while the URL is empty or still the deploy-time
    /// placeholder. Callers treat an unconfigured backend as a
    /// configuration error on every attempted call.
    pub fn is_configured(&self) -> bool {
        !self.base_url.trim().is_empty() && self.base_url != BACKEND_URL_PLACEHOLDER
    }
}

/// Client behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Delay before re-fetching deployment status after a trigger (seconds)
    #[serde(default = "default_deploy_status_delay")]
    pub deploy_status_delay_seconds: u64,

    /// Log line limit used when the caller does not supply one
    #[serde(default = "default_log_limit")]
    pub default_log_limit: u32,

    /// Log source used when the caller does not supply one
    #[serde(default = "default_log_source")]
    pub default_log_source: String,
}

fn default_deploy_status_delay() -> u64 {
    5
}

fn default_log_limit() -> u32 {
    100
}

fn default_log_source() -> String {
    "backend".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            deploy_status_delay_seconds: default_deploy_status_delay(),
            default_log_limit: default_log_limit(),
            default_log_source: default_log_source(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file, applying CLI overrides
    ///
    /// A missing config file is not an error: defaults are used so the
    /// binary still starts (and reports the placeholder URL on the first
    /// attempted call). A present-but-invalid file is an error.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the YAML configuration file
    /// * `cli` - Parsed CLI arguments; `--backend-url` (or `ECKO_BACKEND_URL`)
    ///   overrides the file's `backend.base_url`
    pub fn load(path: &str, cli: &Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            let contents = std::fs::read_to_string(path)?;
            serde_yaml::from_str(&contents)?
        } else {
            tracing::debug!("Config file {} not found, using defaults", path);
            Config::default()
        };

        if let Some(base_url) = &cli.backend_url {
            tracing::debug!("Overriding backend URL from CLI/environment");
            config.backend.base_url = base_url.clone();
        }

        Ok(config)
    }

    /// Validate the configuration
    ///
    /// The placeholder backend URL is allowed here; it fails closed at call
    /// time so the error surfaces once per attempted call rather than
    /// preventing startup. A URL that is set but unparsable is rejected.
    pub fn validate(&self) -> Result<()> {
        if self.backend.is_configured() {
            Url::parse(&self.backend.base_url).map_err(|e| {
                EckoError::Config(format!(
                    "backend URL '{}' is not a valid URL: {}",
                    self.backend.base_url, e
                ))
            })?;
        }

        if self.backend.timeout_seconds == 0 {
            return Err(EckoError::Config("timeout_seconds must be greater than zero".into()).into());
        }

        Ok(())
    }
}
