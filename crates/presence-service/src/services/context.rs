//! Service context - dependency container for services
//!
//! Holds the collaborators, the listener registries, and the mutable
//! provider state shared by every service.

use dashmap::DashSet;
use parking_lot::{Mutex, RwLock};
use std::sync::{Arc, OnceLock};

use presence_common::PresenceConfig;
use presence_core::traits::{AuthorizationHandler, ContactList, ExtendedAuthorization, ProtocolStack};
use presence_core::{
    ListenerHub, PresenceError, PresenceResult, PresenceStatus, SharedListenerHub, StatusBitmask,
    StatusCodec,
};

/// Our own presence as last confirmed by the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderPresenceState {
    pub current_status: StatusBitmask,
    pub current_status_message: String,
}

impl Default for ProviderPresenceState {
    fn default() -> Self {
        Self {
            current_status: StatusBitmask::UNKNOWN,
            current_status_message: String::new(),
        }
    }
}

/// Service context containing all dependencies
pub struct ServiceContext {
    // Collaborators
    protocol: Arc<dyn ProtocolStack>,
    contact_list: Arc<dyn ContactList>,
    extended_authorization: Option<Arc<dyn ExtendedAuthorization>>,
    authorization_handler: RwLock<Option<Arc<dyn AuthorizationHandler>>>,

    // Account flavour
    codec: &'static dyn StatusCodec,
    config: PresenceConfig,

    // Listeners
    listeners: SharedListenerHub,

    // Mutable state
    state: Mutex<ProviderPresenceState>,
    seen_available: DashSet<String>,
    awaiting_group_lock: Mutex<()>,
    supported_statuses: OnceLock<Vec<PresenceStatus>>,
}

impl ServiceContext {
    /// Create a new service context
    pub fn new(
        protocol: Arc<dyn ProtocolStack>,
        contact_list: Arc<dyn ContactList>,
        extended_authorization: Option<Arc<dyn ExtendedAuthorization>>,
        authorization_handler: Option<Arc<dyn AuthorizationHandler>>,
        config: PresenceConfig,
    ) -> Self {
        Self {
            protocol,
            contact_list,
            extended_authorization,
            authorization_handler: RwLock::new(authorization_handler),
            codec: config.account.mode.codec(),
            config,
            listeners: Arc::new(ListenerHub::new()),
            state: Mutex::new(ProviderPresenceState::default()),
            seen_available: DashSet::new(),
            awaiting_group_lock: Mutex::new(()),
            supported_statuses: OnceLock::new(),
        }
    }

    // === Collaborators ===

    pub fn protocol(&self) -> &dyn ProtocolStack {
        self.protocol.as_ref()
    }

    pub fn contact_list(&self) -> &dyn ContactList {
        self.contact_list.as_ref()
    }

    pub fn extended_authorization(&self) -> Option<&dyn ExtendedAuthorization> {
        self.extended_authorization.as_deref()
    }

    /// Current authorization handler, if the application installed one
    pub fn authorization_handler(&self) -> Option<Arc<dyn AuthorizationHandler>> {
        self.authorization_handler.read().clone()
    }

    pub fn set_authorization_handler(&self, handler: Arc<dyn AuthorizationHandler>) {
        *self.authorization_handler.write() = Some(handler);
    }

    // === Account ===

    pub fn codec(&self) -> &'static dyn StatusCodec {
        self.codec
    }

    pub fn config(&self) -> &PresenceConfig {
        &self.config
    }

    /// Statuses this account supports, computed on first use
    pub fn supported_statuses(&self) -> &[PresenceStatus] {
        self.supported_statuses
            .get_or_init(|| self.codec.supported_statuses().to_vec())
    }

    /// Fail with `NotConnected` unless the protocol stack is registered
    pub fn ensure_connected(&self) -> PresenceResult<()> {
        if self.protocol.is_registered() {
            Ok(())
        } else {
            Err(PresenceError::NotConnected)
        }
    }

    // === Listeners ===

    pub fn listeners(&self) -> &ListenerHub {
        self.listeners.as_ref()
    }

    pub fn shared_listeners(&self) -> SharedListenerHub {
        self.listeners.clone()
    }

    // === State ===

    pub fn state(&self) -> &Mutex<ProviderPresenceState> {
        &self.state
    }

    /// Identifiers already re-requested after being seen online
    pub fn seen_available(&self) -> &DashSet<String> {
        &self.seen_available
    }

    /// Serialises lookup and lazy creation of the awaiting authorization group
    pub(crate) fn awaiting_group_lock(&self) -> &Mutex<()> {
        &self.awaiting_group_lock
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("mode", &self.codec.mode())
            .field("state", &*self.state.lock())
            .field("listeners", &self.listeners)
            .field("collaborators", &"...")
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
#[derive(Default)]
pub struct ServiceContextBuilder {
    protocol: Option<Arc<dyn ProtocolStack>>,
    contact_list: Option<Arc<dyn ContactList>>,
    extended_authorization: Option<Arc<dyn ExtendedAuthorization>>,
    authorization_handler: Option<Arc<dyn AuthorizationHandler>>,
    config: Option<PresenceConfig>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn protocol(mut self, protocol: Arc<dyn ProtocolStack>) -> Self {
        self.protocol = Some(protocol);
        self
    }

    pub fn contact_list(mut self, contact_list: Arc<dyn ContactList>) -> Self {
        self.contact_list = Some(contact_list);
        self
    }

    pub fn extended_authorization(mut self, extended: Arc<dyn ExtendedAuthorization>) -> Self {
        self.extended_authorization = Some(extended);
        self
    }

    pub fn authorization_handler(mut self, handler: Arc<dyn AuthorizationHandler>) -> Self {
        self.authorization_handler = Some(handler);
        self
    }

    pub fn config(mut self, config: PresenceConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `PresenceError::InvalidArgument` if the protocol stack or the
    /// contact list is missing
    pub fn build(self) -> PresenceResult<ServiceContext> {
        Ok(ServiceContext::new(
            self.protocol
                .ok_or_else(|| PresenceError::invalid_argument("protocol is required"))?,
            self.contact_list
                .ok_or_else(|| PresenceError::invalid_argument("contact_list is required"))?,
            self.extended_authorization,
            self.authorization_handler,
            self.config.unwrap_or_default(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{InMemoryContactList, MockProtocol};
    use presence_core::AccountMode;

    #[test]
    fn test_build_requires_collaborators() {
        let err = ServiceContextBuilder::new()
            .contact_list(Arc::new(InMemoryContactList::new("Contacts")))
            .build()
            .unwrap_err();
        assert!(err.is_invalid_argument());

        let err = ServiceContextBuilder::new()
            .protocol(Arc::new(MockProtocol::new("1")))
            .build()
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_defaults() {
        let protocol = Arc::new(MockProtocol::new("1"));
        let ctx = ServiceContextBuilder::new()
            .protocol(protocol.clone())
            .contact_list(Arc::new(InMemoryContactList::new("Contacts")))
            .build()
            .unwrap();

        assert_eq!(ctx.codec().mode(), AccountMode::Extended);
        assert!(ctx.state().lock().current_status.is_unknown());
        assert!(ctx.authorization_handler().is_none());
        assert!(ctx.extended_authorization().is_none());
        assert!(ctx.ensure_connected().is_ok());

        protocol.set_registered(false);
        assert!(ctx.ensure_connected().unwrap_err().is_not_connected());
    }
}
