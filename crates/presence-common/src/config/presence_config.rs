//! Presence engine configuration
//!
//! Loads configuration from environment variables or from a config file
//! layered with `PRESENCE__*` environment overrides.

use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File, FileFormat};
use presence_core::AccountMode;
use serde::Deserialize;
use std::env;
use std::path::Path;
use std::time::Duration;

/// Main engine configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PresenceConfig {
    #[serde(default)]
    pub account: AccountSettings,
    #[serde(default)]
    pub status_query: StatusQueryConfig,
    #[serde(default)]
    pub authorization: AuthorizationConfig,
}

/// Account settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountSettings {
    #[serde(default)]
    pub mode: AccountMode,
}

/// On-demand status query settings
#[derive(Debug, Clone, Deserialize)]
pub struct StatusQueryConfig {
    /// Upper bound on how long a caller waits for the server, in milliseconds
    #[serde(default = "default_query_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for StatusQueryConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_query_timeout_ms(),
        }
    }
}

/// Authorization handshake settings
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizationConfig {
    /// Name of the virtual group holding contacts awaiting authorization
    #[serde(default = "default_awaiting_group_name")]
    pub awaiting_group_name: String,
    /// Period of the awaiting authorization poller, in seconds
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Delay before the first poll after registration, in seconds
    #[serde(default = "default_poll_initial_delay_secs")]
    pub poll_initial_delay_secs: u64,
    /// Reason sent with re-issued authorization requests
    #[serde(default = "default_re_request_reason")]
    pub re_request_reason: String,
}

impl Default for AuthorizationConfig {
    fn default() -> Self {
        Self {
            awaiting_group_name: default_awaiting_group_name(),
            poll_interval_secs: default_poll_interval_secs(),
            poll_initial_delay_secs: default_poll_initial_delay_secs(),
            re_request_reason: default_re_request_reason(),
        }
    }
}

// Default value functions
fn default_query_timeout_ms() -> u64 {
    10_000
}

fn default_awaiting_group_name() -> String {
    "Awaiting authorization".to_string()
}

fn default_poll_interval_secs() -> u64 {
    120
}

fn default_poll_initial_delay_secs() -> u64 {
    15
}

fn default_re_request_reason() -> String {
    "I'm resending my request. Please authorize me!".to_string()
}

impl PresenceConfig {
    /// Load configuration from environment variables
    ///
    /// Every variable is optional; missing ones fall back to defaults.
    ///
    /// # Errors
    /// Returns an error if a variable is present but cannot be parsed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let config = Self {
            account: AccountSettings {
                mode: match env::var("PRESENCE_ACCOUNT_MODE") {
                    Ok(value) => value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("PRESENCE_ACCOUNT_MODE", value))?,
                    Err(_) => AccountMode::default(),
                },
            },
            status_query: StatusQueryConfig {
                timeout_ms: parse_var("PRESENCE_QUERY_TIMEOUT_MS")?
                    .unwrap_or_else(default_query_timeout_ms),
            },
            authorization: AuthorizationConfig {
                awaiting_group_name: env::var("PRESENCE_AWAITING_GROUP_NAME")
                    .unwrap_or_else(|_| default_awaiting_group_name()),
                poll_interval_secs: parse_var("PRESENCE_POLL_INTERVAL_SECS")?
                    .unwrap_or_else(default_poll_interval_secs),
                poll_initial_delay_secs: parse_var("PRESENCE_POLL_INITIAL_DELAY_SECS")?
                    .unwrap_or_else(default_poll_initial_delay_secs),
                re_request_reason: env::var("PRESENCE_RE_REQUEST_REASON")
                    .unwrap_or_else(|_| default_re_request_reason()),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file, with `PRESENCE__SECTION__KEY`
    /// environment variables taking precedence. A missing file is allowed.
    ///
    /// # Errors
    /// Returns an error if the file cannot be parsed or a value is invalid
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = config::Config::builder()
            .add_source(File::from(path.as_ref()).required(false));
        Self::build(builder)
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    /// Returns an error if the text cannot be parsed or a value is invalid
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let builder =
            config::Config::builder().add_source(File::from_str(contents, FileFormat::Toml));
        Self::build(builder)
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let config: Self = builder
            .add_source(Environment::with_prefix("PRESENCE").separator("__"))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot run with
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidValue` naming the offending setting
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.authorization.poll_interval_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "authorization.poll_interval_secs",
                "must be greater than zero".to_string(),
            ));
        }
        if self.authorization.awaiting_group_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "authorization.awaiting_group_name",
                "must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.status_query.timeout_ms)
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.authorization.poll_interval_secs)
    }

    #[must_use]
    pub fn poll_initial_delay(&self) -> Duration {
        Duration::from_secs(self.authorization.poll_initial_delay_secs)
    }
}

fn parse_var(name: &'static str) -> Result<Option<u64>, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(name, value)),
        Err(_) => Ok(None),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),

    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}
