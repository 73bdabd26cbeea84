//! Registration bridge
//!
//! Reacts to the account logging in or out: wires listeners on login, and
//! on logout resets our status and marks every contact offline, since the
//! server will not tell us about them any more.

use std::sync::Arc;
use tracing::{debug, error, info, instrument};

use presence_core::{
    PresenceStatus, ProviderPresenceStatusChangeEvent, RegistrationState, StatusBitmask,
};

use super::context::ServiceContext;
use super::poller::AwaitingAuthorizationPoller;
use super::presence::PresenceService;
use crate::router::ProtocolEventRouter;

/// Registration service
pub struct RegistrationService<'a> {
    ctx: &'a Arc<ServiceContext>,
    poller: &'a AwaitingAuthorizationPoller,
}

impl<'a> RegistrationService<'a> {
    pub fn new(ctx: &'a Arc<ServiceContext>, poller: &'a AwaitingAuthorizationPoller) -> Self {
        Self { ctx, poller }
    }

    #[instrument(skip(self))]
    pub async fn registration_state_changed(&self, old: RegistrationState, new: RegistrationState) {
        info!(%old, %new, "Registration state changed");

        match new {
            RegistrationState::Registered => self.on_registered().await,
            state if state.is_disconnect() => self.on_disconnected(),
            _ => debug!("No presence action for this registration state"),
        }
    }

    async fn on_registered(&self) {
        let router = Arc::new(ProtocolEventRouter::new(self.ctx.clone()));
        if let Err(e) = self.ctx.protocol().attach_listeners(router).await {
            error!(error = %e, "Failed to attach protocol listeners");
        }

        if let Err(e) = self
            .ctx
            .contact_list()
            .init(self.ctx.shared_listeners())
            .await
        {
            error!(error = %e, "Failed to initialise the contact list");
        }

        if self.ctx.codec().supports_extended_authorization()
            && self.ctx.extended_authorization().is_some()
        {
            self.poller.start(self.ctx.clone());
        }
    }

    fn on_disconnected(&self) {
        self.poller.cancel();

        let codec = self.ctx.codec();
        let old = std::mem::replace(
            &mut self.ctx.state().lock().current_status,
            StatusBitmask::UNKNOWN,
        );
        if !old.is_unknown() {
            self.ctx
                .listeners()
                .fire_provider_status_changed(&ProviderPresenceStatusChangeEvent::new(
                    codec.decode(old),
                    PresenceStatus::Offline,
                ));
        }

        let list = self.ctx.contact_list();
        let presence = PresenceService::new(self.ctx);
        let mut forced = 0usize;
        let mut pending = vec![list.root_group()];
        while let Some(group) = pending.pop() {
            pending.extend(list.subgroups(&group.name));
            for contact in list.contacts(&group.name) {
                if contact.is_online()
                    && presence.apply_contact_status(
                        &contact.identifier,
                        PresenceStatus::Offline,
                        Some(group.clone()),
                    )
                {
                    forced += 1;
                }
            }
        }
        info!(contacts = forced, "Marked contacts offline after disconnect");
    }
}
