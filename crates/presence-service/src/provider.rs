//! Presence provider facade
//!
//! The public contract of the engine. Applications hold one provider per
//! account, feed it registration changes, and observe it through listeners.

use std::sync::Arc;

use presence_core::traits::{AuthorizationHandler, ProtocolEventHandler};
use presence_core::{
    Contact, ContactGroup, ContactPresenceStatusListener, PresenceResult, PresenceStatus,
    ProviderPresenceStatusListener, RegistrationState, ServerStoredGroupListener,
    SubscriptionListener,
};

use crate::router::ProtocolEventRouter;
use crate::services::{
    AwaitingAuthorizationPoller, PresenceService, RegistrationService, ServiceContext,
    SubscriptionService,
};

/// Presence and subscription operations for one account
#[derive(Debug)]
pub struct PresenceProvider {
    ctx: Arc<ServiceContext>,
    poller: AwaitingAuthorizationPoller,
}

impl PresenceProvider {
    pub fn new(ctx: ServiceContext) -> Self {
        Self {
            ctx: Arc::new(ctx),
            poller: AwaitingAuthorizationPoller::new(),
        }
    }

    pub fn context(&self) -> &Arc<ServiceContext> {
        &self.ctx
    }

    /// Handler to give the protocol stack when it is wired up outside of
    /// registration
    pub fn event_handler(&self) -> Arc<dyn ProtocolEventHandler> {
        Arc::new(ProtocolEventRouter::new(self.ctx.clone()))
    }

    /// Feed a registration state transition of the protocol provider
    pub async fn registration_state_changed(&self, old: RegistrationState, new: RegistrationState) {
        RegistrationService::new(&self.ctx, &self.poller)
            .registration_state_changed(old, new)
            .await;
    }

    /// Whether the awaiting authorization poller is running
    pub fn is_polling(&self) -> bool {
        self.poller.is_running()
    }

    fn presence(&self) -> PresenceService<'_> {
        PresenceService::new(&self.ctx)
    }

    fn subscriptions(&self) -> SubscriptionService<'_> {
        SubscriptionService::new(&self.ctx)
    }

    // =========================================================================
    // Own presence
    // =========================================================================

    pub fn presence_status(&self) -> PresenceStatus {
        self.presence().presence_status()
    }

    pub async fn publish_presence_status(
        &self,
        status: PresenceStatus,
        message: &str,
    ) -> PresenceResult<()> {
        self.presence().publish_presence_status(status, message).await
    }

    pub fn current_status_message(&self) -> String {
        self.presence().current_status_message()
    }

    pub async fn set_status_message(&self, message: &str) -> PresenceResult<()> {
        self.presence().set_status_message(message).await
    }

    /// Statuses this account supports. Each call returns a fresh iterator.
    pub fn supported_status_set(&self) -> impl Iterator<Item = PresenceStatus> + '_ {
        self.presence().supported_statuses().iter().copied()
    }

    pub async fn query_contact_status(&self, identifier: &str) -> PresenceResult<PresenceStatus> {
        self.presence().query_contact_status(identifier).await
    }

    // =========================================================================
    // Contacts and groups
    // =========================================================================

    pub async fn subscribe(&self, identifier: &str) -> PresenceResult<()> {
        self.subscriptions().subscribe(identifier).await
    }

    pub async fn subscribe_in_group(&self, group: &str, identifier: &str) -> PresenceResult<()> {
        self.subscriptions().subscribe_in_group(group, identifier).await
    }

    pub async fn unsubscribe(&self, contact: &Contact) -> PresenceResult<()> {
        self.subscriptions().unsubscribe(contact).await
    }

    pub async fn move_contact_to_group(&self, contact: &Contact, group: &str) -> PresenceResult<()> {
        self.subscriptions().move_contact(contact, group).await
    }

    pub async fn create_server_stored_contact_group(
        &self,
        parent: &str,
        name: &str,
    ) -> PresenceResult<()> {
        self.subscriptions().create_group(parent, name).await
    }

    pub async fn remove_server_stored_contact_group(&self, group: &str) -> PresenceResult<()> {
        self.subscriptions().remove_group(group).await
    }

    pub async fn rename_server_stored_contact_group(
        &self,
        group: &str,
        new_name: &str,
    ) -> PresenceResult<()> {
        self.subscriptions().rename_group(group, new_name).await
    }

    pub fn create_unresolved_contact(
        &self,
        address: &str,
        persistent_data: Option<String>,
        parent: Option<&str>,
    ) -> PresenceResult<Contact> {
        self.subscriptions()
            .create_unresolved_contact(address, persistent_data, parent)
    }

    pub fn create_unresolved_contact_group(
        &self,
        uid: &str,
        persistent_data: Option<String>,
    ) -> ContactGroup {
        self.subscriptions().create_unresolved_group(uid, persistent_data)
    }

    pub fn create_volatile_contact(&self, identifier: &str) -> Contact {
        self.subscriptions().create_volatile_contact(identifier)
    }

    pub fn find_contact_by_id(&self, identifier: &str) -> Option<Contact> {
        self.subscriptions().find_contact(identifier)
    }

    pub fn server_stored_contact_list_root(&self) -> ContactGroup {
        self.subscriptions().root_group()
    }

    /// Our own account as a contact
    pub fn local_contact(&self) -> Contact {
        Contact {
            resolved: true,
            persistent: false,
            ..Contact::unresolved(self.ctx.protocol().local_identifier())
        }
        .with_status(self.presence_status())
    }

    // =========================================================================
    // Authorization
    // =========================================================================

    pub fn set_authorization_handler(&self, handler: Arc<dyn AuthorizationHandler>) {
        self.ctx.set_authorization_handler(handler);
    }

    // =========================================================================
    // Listeners
    // =========================================================================

    pub fn add_contact_presence_status_listener(
        &self,
        listener: Arc<dyn ContactPresenceStatusListener>,
    ) {
        self.ctx.listeners().contact_presence().add(listener);
    }

    pub fn remove_contact_presence_status_listener(
        &self,
        listener: &Arc<dyn ContactPresenceStatusListener>,
    ) {
        self.ctx.listeners().contact_presence().remove(listener);
    }

    pub fn add_subscription_listener(&self, listener: Arc<dyn SubscriptionListener>) {
        self.ctx.listeners().subscription().add(listener);
    }

    pub fn remove_subscription_listener(&self, listener: &Arc<dyn SubscriptionListener>) {
        self.ctx.listeners().subscription().remove(listener);
    }

    pub fn add_provider_presence_status_listener(
        &self,
        listener: Arc<dyn ProviderPresenceStatusListener>,
    ) {
        self.ctx.listeners().provider_presence().add(listener);
    }

    pub fn remove_provider_presence_status_listener(
        &self,
        listener: &Arc<dyn ProviderPresenceStatusListener>,
    ) {
        self.ctx.listeners().provider_presence().remove(listener);
    }

    pub fn add_server_stored_group_listener(&self, listener: Arc<dyn ServerStoredGroupListener>) {
        self.ctx.listeners().group_change().add(listener);
    }

    pub fn remove_server_stored_group_listener(
        &self,
        listener: &Arc<dyn ServerStoredGroupListener>,
    ) {
        self.ctx.listeners().group_change().remove(listener);
    }
}
