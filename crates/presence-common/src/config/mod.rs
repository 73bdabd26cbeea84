//! Configuration structs

mod presence_config;

pub use presence_config::{
    AccountSettings, AuthorizationConfig, ConfigError, PresenceConfig, StatusQueryConfig,
};
