//! # presence-common
//!
//! Shared utilities: engine configuration and tracing setup.

pub mod config;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use config::{
    AccountSettings, AuthorizationConfig, ConfigError, PresenceConfig, StatusQueryConfig,
};
pub use telemetry::{
    init_tracing, init_tracing_with_config, try_init_tracing, try_init_tracing_with_config,
    TracingConfig, TracingError,
};
