//! Test helpers for integration tests
//!
//! Provides a registered provider wired to mock collaborators, and
//! shorthands for pushing server notifications through it.

use std::ops::Deref;

use anyhow::Result;
use presence_common::{try_init_tracing_with_config, PresenceConfig, TracingConfig};
use presence_core::{ProtocolEvent, RegistrationState};
use presence_service::testing::{InMemoryContactList, ProviderHarness};

use crate::fixtures::standard_contact_list;

/// Settings shared by every test; environment overrides still apply
const TEST_CONFIG: &str = r#"
[account]
mode = "extended"

[status_query]
timeout_ms = 500

[authorization]
awaiting_group_name = "Awaiting authorization"
poll_interval_secs = 120
poll_initial_delay_secs = 15
"#;

/// Install a test writer subscriber once per process
pub fn init_test_tracing() {
    let _ = try_init_tracing_with_config(&TracingConfig::testing());
}

/// Configuration used by [`TestProvider::start`]
pub fn test_config() -> Result<PresenceConfig> {
    PresenceConfig::from_toml(TEST_CONFIG).map_err(|e| anyhow::anyhow!("Config error: {e}"))
}

/// A provider that has gone through registration
pub struct TestProvider {
    harness: ProviderHarness,
}

impl TestProvider {
    /// Start a provider over the standard contact list
    pub async fn start() -> Result<Self> {
        Self::start_with(test_config()?, standard_contact_list()).await
    }

    /// Start a provider with custom config and contacts
    pub async fn start_with(config: PresenceConfig, contacts: InMemoryContactList) -> Result<Self> {
        init_test_tracing();

        let harness = ProviderHarness::new(config, contacts);
        harness
            .provider
            .registration_state_changed(RegistrationState::Registering, RegistrationState::Registered)
            .await;

        anyhow::ensure!(
            harness.protocol.has_handler(),
            "registration did not attach the protocol handler"
        );
        Ok(Self { harness })
    }

    /// Push a server notification through the attached router
    pub async fn emit(&self, event: ProtocolEvent) -> Result<()> {
        anyhow::ensure!(
            self.harness.protocol.emit(event).await,
            "no protocol handler attached"
        );
        Ok(())
    }

    /// Report that the server wants authorization before adding `identifier`
    pub async fn require_authorization(&self, identifier: &str, group: Option<&str>) -> Result<bool> {
        self.harness
            .protocol
            .require_authorization(identifier, group)
            .await
            .ok_or_else(|| anyhow::anyhow!("no protocol handler attached"))
    }

    /// Drop the connection
    pub async fn disconnect(&self) {
        self.harness.protocol.set_registered(false);
        self.harness
            .provider
            .registration_state_changed(
                RegistrationState::Registered,
                RegistrationState::ConnectionFailed,
            )
            .await;
    }
}

impl Deref for TestProvider {
    type Target = ProviderHarness;

    fn deref(&self) -> &Self::Target {
        &self.harness
    }
}
