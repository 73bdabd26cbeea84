//! Presence service
//!
//! Owns our own status and status message, publishes status changes, and
//! applies server reports about our own account and about buddies.

use tracing::{debug, info, instrument, warn};

use presence_core::{
    ContactGroup, ContactPresenceStatusChangeEvent, ContactPropertyChangeEvent,
    PresenceError, PresenceResult, PresenceStatus, ProtocolCommand,
    ProviderPresenceStatusChangeEvent, StatusMessageChangeEvent, UserInfo,
};

use super::context::ServiceContext;
use super::status_query::StatusQueryService;

/// Property name used when a contact's image changes
pub const IMAGE_PROPERTY: &str = "image";

/// Presence service
pub struct PresenceService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PresenceService<'a> {
    /// Create a new PresenceService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Our own status as last confirmed by the server
    pub fn presence_status(&self) -> PresenceStatus {
        let current = self.ctx.state().lock().current_status;
        self.ctx.codec().decode(current)
    }

    /// Our own status message as last confirmed by the server
    pub fn current_status_message(&self) -> String {
        self.ctx.state().lock().current_status_message.clone()
    }

    pub fn supported_statuses(&self) -> &'a [PresenceStatus] {
        self.ctx.supported_statuses()
    }

    /// Ask the server to change our status
    ///
    /// Local state only changes when the server confirms through an own-info
    /// report; a self-query is issued afterwards to provoke one.
    #[instrument(skip(self, message))]
    pub async fn publish_presence_status(
        &self,
        status: PresenceStatus,
        message: &str,
    ) -> PresenceResult<()> {
        self.ctx.ensure_connected()?;

        let current = self.presence_status();
        let commands = self
            .ctx
            .codec()
            .publish_commands(status, current, message)
            .map_err(|e| match e {
                PresenceError::UnsupportedStatus(status) => PresenceError::invalid_argument(
                    format!("{status} is not a status this account can publish"),
                ),
                other => other,
            })?;

        for command in commands {
            self.ctx.protocol().send_command(command).await?;
        }

        info!(status = %status, "Presence status published");

        let local = self.ctx.protocol().local_identifier();
        let confirmed = StatusQueryService::new(self.ctx).query(&local).await;
        debug!(requested = %status, reported = %confirmed, "Self query after publish");

        Ok(())
    }

    /// Ask the server to change our status message
    #[instrument(skip(self))]
    pub async fn set_status_message(&self, message: &str) -> PresenceResult<()> {
        self.ctx.ensure_connected()?;
        self.ctx
            .protocol()
            .send_command(ProtocolCommand::SetStatusMessage {
                message: message.to_string(),
            })
            .await
    }

    /// Query a contact's status from the server, bounded by the configured
    /// timeout. Errors and timeouts yield Offline.
    #[instrument(skip(self))]
    pub async fn query_contact_status(&self, identifier: &str) -> PresenceResult<PresenceStatus> {
        self.ctx.ensure_connected()?;
        Ok(StatusQueryService::new(self.ctx).query(identifier).await)
    }

    // =========================================================================
    // Server reports
    // =========================================================================

    /// Apply an own-info report. Returns `true` if an event was dispatched.
    pub fn handle_own_info(&self, report: &UserInfo) -> bool {
        let codec = self.ctx.codec();
        let reported = codec.own_status(report);
        let new_status = codec.decode(reported);

        let old_status = {
            let mut state = self.ctx.state().lock();
            let old_status = codec.decode(state.current_status);
            if old_status == new_status {
                None
            } else {
                state.current_status = reported;
                Some(old_status)
            }
        };

        let Some(old_status) = old_status else {
            debug!(status = %new_status, "Own status unchanged, not dispatching");
            return false;
        };

        info!(old = %old_status, new = %new_status, "Own presence status changed");
        self.ctx
            .listeners()
            .fire_provider_status_changed(&ProviderPresenceStatusChangeEvent::new(
                old_status, new_status,
            ));
        true
    }

    /// Apply a reported status message. Returns `true` if an event was
    /// dispatched.
    pub fn handle_own_status_message(&self, message: Option<&str>) -> bool {
        let Some(message) = message else {
            return false;
        };

        let old_message = {
            let mut state = self.ctx.state().lock();
            if state.current_status_message == message {
                return false;
            }
            std::mem::replace(&mut state.current_status_message, message.to_string())
        };

        debug!(old = %old_message, new = %message, "Own status message changed");
        self.ctx
            .listeners()
            .fire_status_message_changed(&StatusMessageChangeEvent::new(old_message, message));
        true
    }

    /// Apply a buddy status report. Returns `true` if an event was dispatched.
    pub fn handle_buddy_status(&self, report: &UserInfo) -> bool {
        if let Some(message) = report.status_message.as_deref() {
            debug!(identifier = %report.identifier, message, "Buddy status message");
        }

        let new_status = self.ctx.codec().buddy_status(report);
        let parent = self.ctx.contact_list().parent_group(&report.identifier);
        self.apply_contact_status(&report.identifier, new_status, parent)
    }

    /// Apply a buddy offline report. Returns `true` if an event was
    /// dispatched.
    pub fn handle_buddy_offline(&self, identifier: &str) -> bool {
        let parent = self.ctx.contact_list().parent_group(identifier);
        self.apply_contact_status(identifier, PresenceStatus::Offline, parent)
    }

    /// Store a new buddy icon and tell subscription listeners
    pub fn handle_buddy_icon(&self, identifier: &str, icon: Option<Vec<u8>>) {
        let describe = |image: &Option<Vec<u8>>| image.as_ref().map(|bytes| format!("{} bytes", bytes.len()));
        let new_value = describe(&icon);

        let list = self.ctx.contact_list();
        let Some(old_icon) = list.set_image(identifier, icon) else {
            debug!(identifier, "Icon for a contact not in our list");
            return;
        };
        let Some(contact) = list.find_contact(identifier) else {
            return;
        };

        self.ctx
            .listeners()
            .fire_contact_modified(&ContactPropertyChangeEvent::new(
                contact,
                IMAGE_PROPERTY,
                describe(&old_icon),
                new_value,
            ));
    }

    /// Set a contact's status and dispatch a change event if it differs
    ///
    /// Only the status field is written, so concurrent edits to the rest of
    /// the contact survive.
    pub(crate) fn apply_contact_status(
        &self,
        identifier: &str,
        new_status: PresenceStatus,
        parent: Option<ContactGroup>,
    ) -> bool {
        let list = self.ctx.contact_list();
        let Some(old_status) = list.set_presence_status(identifier, new_status) else {
            warn!(identifier, "Status change for a contact not in our list");
            return false;
        };
        if old_status == new_status {
            debug!(identifier, status = %new_status, "Contact status unchanged");
            return false;
        }
        let Some(contact) = list.find_contact(identifier) else {
            return false;
        };

        debug!(
            identifier,
            old = %old_status,
            new = %new_status,
            "Contact presence status changed"
        );
        self.ctx
            .listeners()
            .fire_contact_presence_changed(&ContactPresenceStatusChangeEvent::new(
                contact, parent, old_status, new_status,
            ));
        true
    }
}
