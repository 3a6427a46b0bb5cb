// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Client configuration
//!
//! A [`RedashConfig`] names the server (`scheme`, `host`, `port`), carries the
//! API key sent with every request and bounds each round-trip with a timeout.
//! It can be built in code or loaded with the `config` crate from an optional
//! file and `REDASH_*` environment variables.

use std::{fmt, path::Path, time::Duration};

use anyhow::ensure;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Deserializer, Serialize, de};
use url::Url;

use crate::{
    error::{RedashError, RedashResult},
    non_empty_string::NonEmptyString,
};

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
const MAX_TIMEOUT_SECONDS: u64 = 300;
const ENV_PREFIX: &str = "REDASH";
const DEFAULT_CONFIG_FILE: &str = "redash";
const API_PREFIX: &str = "api";

/// URL scheme used to reach the server
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    /// Plain HTTP
    #[default]
    Http,
    /// HTTP over TLS
    Https,
}

impl Scheme {
    /// Scheme as it appears in a URL
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated per-request timeout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeoutSeconds(Duration);

impl TimeoutSeconds {
    /// Create a new `TimeoutSeconds`, ensuring the value is within valid bounds
    ///
    /// # Errors
    ///
    /// Returns an error if timeout is 0 or greater than 300 seconds
    pub fn new(seconds: u64) -> anyhow::Result<Self> {
        ensure!(seconds != 0, "timeout must be greater than 0");
        ensure!(
            seconds <= MAX_TIMEOUT_SECONDS,
            "timeout cannot exceed {MAX_TIMEOUT_SECONDS}"
        );
        Ok(Self(Duration::from_secs(seconds)))
    }

    /// Default timeout (30 seconds)
    pub const fn default_value() -> Self {
        Self(Duration::from_secs(DEFAULT_TIMEOUT_SECONDS))
    }

    /// Get the timeout duration
    pub fn value(&self) -> Duration {
        self.0
    }

    /// Get the timeout in whole seconds
    pub fn seconds(&self) -> u64 {
        self.0.as_secs()
    }
}

impl<'de> Deserialize<'de> for TimeoutSeconds {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let seconds = u64::deserialize(deserializer)?;
        Self::new(seconds).map_err(|e| de::Error::custom(e.to_string()))
    }
}

impl Default for TimeoutSeconds {
    fn default() -> Self {
        Self::default_value()
    }
}

/// Connection settings for a Redash server
#[derive(Clone, Deserialize)]
pub struct RedashConfig {
    /// URL scheme
    #[serde(default)]
    pub scheme: Scheme,
    /// Server host name
    pub host: NonEmptyString,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
    /// API key passed as the `api_key` query parameter
    pub api_key: NonEmptyString,
    /// Per-request timeout (validated range: 1-300 seconds)
    #[serde(default)]
    pub timeout_seconds: TimeoutSeconds,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl fmt::Debug for RedashConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedashConfig")
            .field("scheme", &self.scheme)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("api_key", &"***")
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl RedashConfig {
    /// Create a configuration with the default timeout
    ///
    /// # Errors
    ///
    /// Returns `RedashError::Config` if the host or API key is blank or the port is 0
    pub fn new(
        scheme: Scheme,
        host: impl Into<String>,
        port: u16,
        api_key: impl Into<String>,
    ) -> RedashResult<Self> {
        let host = NonEmptyString::new(host)
            .map_err(|e| RedashError::Config(format!("invalid host: {e}")))?;
        let api_key = NonEmptyString::new(api_key)
            .map_err(|e| RedashError::Config(format!("invalid API key: {e}")))?;
        if port == 0 {
            return Err(RedashError::Config("port cannot be 0".to_string()));
        }

        Ok(Self {
            scheme,
            host,
            port,
            api_key,
            timeout_seconds: TimeoutSeconds::default(),
        })
    }

    /// Create a configuration from a base URL such as `https://redash.example.com:8443`
    ///
    /// A missing port falls back to the scheme's default port.
    ///
    /// # Errors
    ///
    /// Returns `RedashError::Config` if the URL cannot be parsed, uses a scheme
    /// other than http(s) or has no host
    pub fn from_url(base_url: &str, api_key: impl Into<String>) -> RedashResult<Self> {
        let url = Url::parse(base_url)
            .map_err(|e| RedashError::Config(format!("invalid base URL '{base_url}': {e}")))?;

        let scheme = match url.scheme() {
            "http" => Scheme::Http,
            "https" => Scheme::Https,
            other => {
                return Err(RedashError::Config(format!(
                    "unsupported URL scheme '{other}'"
                )));
            }
        };
        let host = url
            .host_str()
            .ok_or_else(|| RedashError::Config(format!("base URL '{base_url}' has no host")))?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| RedashError::Config(format!("base URL '{base_url}' has no port")))?;

        Self::new(scheme, host, port, api_key)
    }

    /// Replace the per-request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: TimeoutSeconds) -> Self {
        self.timeout_seconds = timeout;
        self
    }

    /// Load configuration from `redash.{json,toml,yaml}` in the working directory
    /// and `REDASH_*` environment variables
    ///
    /// # Errors
    ///
    /// Returns `RedashError::Config` if configuration is invalid or incomplete
    pub fn load() -> RedashResult<Self> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load configuration using the config crate with hierarchical sources
    ///
    /// Sources in order, later ones override earlier ones:
    /// 1. Default values (`scheme = http`, `port = 5000`, `timeout_seconds = 30`)
    /// 2. The given configuration file, if it exists
    /// 3. Environment variables with the `REDASH_` prefix (`REDASH_HOST`, `REDASH_API_KEY`, ...)
    ///
    /// # Errors
    ///
    /// Returns `RedashError::Config` if configuration is invalid or incomplete
    pub fn load_from(file: impl AsRef<Path>) -> RedashResult<Self> {
        Self::build(file.as_ref())
            .map_err(|e| RedashError::Config(format!("failed to load configuration: {e}")))
    }

    fn build(file: &Path) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("scheme", Scheme::default().as_str())?
            .set_default("port", i64::from(DEFAULT_PORT))?
            .set_default("timeout_seconds", DEFAULT_TIMEOUT_SECONDS)?
            .add_source(File::with_name(&file.to_string_lossy()).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        let loaded: Self = config.try_deserialize()?;
        if loaded.port == 0 {
            return Err(ConfigError::Message("port cannot be 0".to_string()));
        }

        Ok(loaded)
    }

    /// Root URL of the server, e.g. `http://redash.internal:5000/`
    ///
    /// # Errors
    ///
    /// Returns `RedashError::Config` if the settings do not form a valid URL
    pub fn server_url(&self) -> RedashResult<Url> {
        let raw = format!("{}://{}:{}", self.scheme, self.host, self.port);
        Url::parse(&raw)
            .map_err(|e| RedashError::Config(format!("invalid server URL '{raw}': {e}")))
    }

    /// Root of the REST API, e.g. `http://redash.internal:5000/api`
    ///
    /// # Errors
    ///
    /// Returns `RedashError::Config` if the settings do not form a valid URL
    pub fn api_url(&self) -> RedashResult<Url> {
        self.server_url()?
            .join(API_PREFIX)
            .map_err(|e| RedashError::Config(format!("invalid API URL: {e}")))
    }
}
