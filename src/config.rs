//! Configuration loading and constants.
//!
//! Loads application configuration from TOML files and defines the fixed values
//! shared by the hello service and the deployment description: the container
//! port, the health-check path, logging defaults and default paths. `AppConfig`
//! is the root configuration struct; its `[context]` table is the context lookup
//! consulted when synthesizing the deployment.

use std::collections::BTreeMap;
use std::path::Path;

use const_format::formatcp;
use serde::Deserialize;

// =============================================================================
// Service Constants
// =============================================================================

/// Port the hello service listens on inside the container
pub const CONTAINER_PORT: u16 = 8080;

/// Path segment answered by the load balancer and container health checks.
/// Requests for it are served normally but never logged.
pub const HEALTHCHECK_PATH: &str = "healthcheck";

/// Health check path as seen by the load balancer
pub const HEALTHCHECK_URL_PATH: &str = formatcp!("/{}", HEALTHCHECK_PATH);

/// Shell command the container runtime uses to probe the service
pub const CONTAINER_HEALTHCHECK_COMMAND: &str = formatcp!(
    "curl -f http://localhost:{}/{} || exit 1",
    CONTAINER_PORT,
    HEALTHCHECK_PATH
);

/// Greetings are never cached, so health checks always reach the service
pub const CACHE_CONTROL_GREETING: &str = "no-store";

/// Seconds to wait for in-flight requests after SIGTERM/SIGINT
pub const SHUTDOWN_GRACE_SECONDS: u64 = 30;

// =============================================================================
// Default Paths and Strings
// =============================================================================

/// Default configuration file path, read when present
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Default bind address for the hello service
pub const DEFAULT_HTTP_HOST: &str = "0.0.0.0";

/// Default log filter when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "hellostack=info,tower_http=info";

/// Default log format (text or json)
pub const DEFAULT_LOG_FORMAT: &str = "text";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub http: HttpServerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Deployment target settings
    #[serde(default)]
    pub deploy: DeployConfig,
    /// Context lookup, keyed `<stack id>:<name>`
    #[serde(default)]
    pub context: ContextLookup,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "HttpServerConfig::default_host")]
    pub host: String,
    #[serde(default = "HttpServerConfig::default_port")]
    pub port: u16,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
        }
    }
}

impl HttpServerConfig {
    fn default_host() -> String {
        DEFAULT_HTTP_HOST.to_string()
    }

    fn default_port() -> u16 {
        CONTAINER_PORT
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log format: "text" (human-readable, default) or "json" (structured)
    #[serde(default = "LoggingConfig::default_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_LOG_FORMAT.to_string(),
        }
    }
}

impl LoggingConfig {
    fn default_format() -> String {
        DEFAULT_LOG_FORMAT.to_string()
    }

    /// Whether structured JSON output was requested
    pub fn is_json(&self) -> bool {
        self.format == "json"
    }
}

/// Where the synthesized stacks are deployed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeployConfig {
    /// Account and region to pin the stacks to. When absent the stacks are
    /// environment-agnostic and can be deployed anywhere.
    pub env: Option<DeployEnvironment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, serde::Serialize)]
pub struct DeployEnvironment {
    pub account: String,
    pub region: String,
}

/// Flat key/value context consulted at synthesis time.
///
/// Values come from the `[context]` table of the config file (native TOML
/// strings and booleans) and from `--context KEY=VALUE` flags, which always
/// arrive as strings and take precedence over the file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct ContextLookup(BTreeMap<String, toml::Value>);

impl ContextLookup {
    /// Returns the raw value stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<&toml::Value> {
        self.0.get(key)
    }

    /// Stores a string value, replacing whatever the file provided.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), toml::Value::String(value.into()));
    }

    /// Applies a `KEY=VALUE` override as given on the command line.
    pub fn apply_override(&mut self, raw: &str) -> Result<(), ConfigError> {
        let (key, value) = raw.split_once('=').ok_or_else(|| {
            ConfigError::Validation(format!("context override '{}' must be KEY=VALUE", raw))
        })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(ConfigError::Validation(format!(
                "context override '{}' has an empty key",
                raw
            )));
        }
        self.set(key, value);
        Ok(())
    }

    /// Reads a string entry. Only TOML strings are accepted.
    pub fn string(&self, key: &str) -> Result<Option<String>, ConfigError> {
        match self.get(key) {
            None => Ok(None),
            Some(toml::Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(ConfigError::Validation(format!(
                "context key '{}' must be a string, got {}",
                key,
                other.type_str()
            ))),
        }
    }

    /// Reads a boolean entry. Accepts a TOML boolean or the strings
    /// `true`/`false` in any case, since command line overrides are strings.
    pub fn flag(&self, key: &str) -> Result<Option<bool>, ConfigError> {
        match self.get(key) {
            None => Ok(None),
            Some(toml::Value::Boolean(b)) => Ok(Some(*b)),
            Some(toml::Value::String(s)) if s.eq_ignore_ascii_case("true") => Ok(Some(true)),
            Some(toml::Value::String(s)) if s.eq_ignore_ascii_case("false") => Ok(Some(false)),
            Some(other) => Err(ConfigError::Validation(format!(
                "context key '{}' must be a boolean, got {}",
                key, other
            ))),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AppConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Loads an explicitly requested file, or the default path when it exists.
    /// Falls back to built-in defaults, which is how the service runs inside
    /// its container.
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG_PATH).is_file() => Self::load(DEFAULT_CONFIG_PATH),
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(contents)?;

        if !matches!(config.logging.format.as_str(), "text" | "json") {
            return Err(ConfigError::Validation(format!(
                "logging.format must be \"text\" or \"json\", got \"{}\"",
                config.logging.format
            )));
        }

        Ok(config)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Validation(String),
}
