//! Layered configuration for the whole pipeline.
//!
//! Sources, later overriding earlier:
//! - Bundled defaults (include_str! from tollbooth.toml)
//! - `~/.config/tollbooth/tollbooth.toml`
//! - `./tollbooth.toml`

use config::{Config, File, FileFormat};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tollbooth_cache::CacheConfig;
use tollbooth_error::{ConfigError, TollboothError, TollboothResult};
use tollbooth_rate_limit::RateLimitConfig;
use tollbooth_retry::RetryConfig;
use tracing::{debug, instrument};

/// HTTP transport settings.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
#[builder(setter(into))]
pub struct TransportConfig {
    /// Base URL all call paths are appended to
    #[serde(default)]
    base_url: String,

    /// Per-request timeout (seconds)
    #[serde(default = "default_timeout")]
    timeout_secs: u64,

    /// Query parameter carrying the API key
    #[serde(default = "default_api_key_param")]
    api_key_param: String,

    /// Top-level payload field holding embedded service errors
    #[serde(default = "default_errors_field")]
    errors_field: String,
}

fn default_timeout() -> u64 {
    30
}

fn default_api_key_param() -> String {
    "apiKey".to_string()
}

fn default_errors_field() -> String {
    "Errors".to_string()
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout_secs: default_timeout(),
            api_key_param: default_api_key_param(),
            errors_field: default_errors_field(),
        }
    }
}

impl TransportConfig {
    /// Request timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Top-level Tollbooth configuration.
///
/// # Example
///
/// ```no_run
/// use tollbooth_client::TollboothConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = TollboothConfig::load()?;
/// println!("Minute quota: {}", config.rate_limit.requests_per_minute());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TollboothConfig {
    /// Rate limiter settings
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Retry settings
    #[serde(default)]
    pub retry: RetryConfig,

    /// Cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Transport settings
    #[serde(default)]
    pub transport: TransportConfig,
}

impl TollboothConfig {
    /// Load configuration from a specific file path.
    ///
    /// Missing sections and fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> TollboothResult<Self> {
        debug!("Loading configuration from file");

        Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                TollboothError::from(ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                TollboothError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }

    /// Load configuration with precedence: current dir > home dir > bundled defaults.
    ///
    /// User config files are optional and silently skipped if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if a present file cannot be parsed.
    #[instrument]
    pub fn load() -> TollboothResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        const DEFAULT_CONFIG: &str = include_str!("../tollbooth.toml");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/tollbooth/tollbooth.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("tollbooth").required(false));

        builder
            .build()
            .map_err(|e| {
                TollboothError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                TollboothError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }
}
