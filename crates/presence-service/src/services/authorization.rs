//! Authorization service
//!
//! Drives the buddy authorization handshake: incoming requests, replies to
//! our own requests, and parking contacts that require authorization in the
//! awaiting authorization group until they answer.

use tracing::{debug, error, info, instrument, trace, warn};

use presence_core::{
    AuthorizationRequest, AuthorizationResponse, AuthorizationResponseCode, Contact,
    PresenceResult, ProtocolCommand, SubscriptionMovedEvent,
};

use super::context::ServiceContext;
use super::subscription::SubscriptionService;

/// Authorization service
pub struct AuthorizationService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AuthorizationService<'a> {
    /// Create a new AuthorizationService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// The server refused to add `identifier` without authorization
    ///
    /// A contact we did not know yet is created under `parent_group` and
    /// moved into the awaiting authorization group. Returns `true` if an
    /// authorization request was sent.
    #[instrument(skip(self))]
    pub async fn authorization_required(
        &self,
        identifier: &str,
        parent_group: Option<&str>,
    ) -> bool {
        let contact = match self.ctx.contact_list().find_contact(identifier) {
            Some(contact) => contact,
            None => match self.park_new_contact(identifier, parent_group) {
                Ok(contact) => contact,
                Err(e) => {
                    error!(error = %e, "Failed to park contact awaiting authorization");
                    return false;
                }
            },
        };

        let Some(handler) = self.ctx.authorization_handler() else {
            warn!("No authorization handler installed, not requesting authorization");
            return false;
        };
        let Some(request) = handler.create_outgoing_request(&contact) else {
            debug!("Authorization handler declined to request authorization");
            return false;
        };

        let commands = [
            ProtocolCommand::GrantFutureAuthorization {
                identifier: identifier.to_string(),
                reason: request.reason.clone(),
            },
            ProtocolCommand::RequestAuthorization {
                identifier: identifier.to_string(),
                reason: request.reason,
            },
        ];
        for command in commands {
            if let Err(e) = self.ctx.protocol().send_command(command).await {
                error!(error = %e, "Failed to send authorization request");
                return false;
            }
        }

        info!("Authorization requested");
        true
    }

    /// Someone asked us for authorization
    #[instrument(skip(self, reason))]
    pub async fn authorization_request_received(&self, identifier: &str, reason: &str) {
        let list = self.ctx.contact_list();
        let contact = list
            .find_contact(identifier)
            .unwrap_or_else(|| list.create_volatile_contact(identifier));

        let Some(handler) = self.ctx.authorization_handler() else {
            warn!("No authorization handler installed, ignoring request");
            return;
        };

        let response = handler.decide_incoming(&AuthorizationRequest::new(reason), &contact);
        let accepted = match response.code {
            AuthorizationResponseCode::Ignore => {
                debug!("Authorization request ignored");
                return;
            }
            AuthorizationResponseCode::Accept => true,
            AuthorizationResponseCode::Reject => false,
        };

        let reply = ProtocolCommand::AuthorizationReply {
            identifier: identifier.to_string(),
            accepted,
            reason: response.reason,
        };
        if let Err(e) = self.ctx.protocol().send_command(reply).await {
            error!(error = %e, "Failed to answer authorization request");
            return;
        }
        info!(accepted, "Answered authorization request");
    }

    /// A contact accepted our authorization request
    #[instrument(skip(self, reason))]
    pub fn authorization_accepted(&self, identifier: &str, reason: Option<String>) {
        let Some(contact) = self.ctx.contact_list().find_contact(identifier) else {
            warn!("Authorization accepted by a contact not in our list");
            return;
        };

        let contact = match self.release_contact(contact) {
            Ok(contact) => contact,
            Err(e) => {
                error!(error = %e, "Failed to move contact out of awaiting authorization");
                return;
            }
        };

        if let Some(handler) = self.ctx.authorization_handler() {
            handler.notify_outcome(
                &AuthorizationResponse::new(AuthorizationResponseCode::Accept, reason),
                &contact,
            );
        }
    }

    /// A contact denied our authorization request. The contact is removed.
    #[instrument(skip(self, reason))]
    pub async fn authorization_denied(&self, identifier: &str, reason: Option<String>) {
        let Some(contact) = self.ctx.contact_list().find_contact(identifier) else {
            warn!("Authorization denied by a contact not in our list");
            return;
        };

        if let Some(handler) = self.ctx.authorization_handler() {
            handler.notify_outcome(
                &AuthorizationResponse::new(AuthorizationResponseCode::Reject, reason),
                &contact,
            );
        }

        if let Err(e) = SubscriptionService::new(self.ctx).unsubscribe(&contact).await {
            error!(error = %e, "Failed to remove contact after denied authorization");
        }
    }

    pub fn future_authorization_granted(&self, identifier: &str, reason: &str) {
        trace!(identifier, reason, "Future authorization granted");
    }

    pub fn you_were_added(&self, identifier: &str) {
        trace!(identifier, "Added by another user");
    }

    /// Create a contact under its parent group and move it into the awaiting
    /// authorization group
    fn park_new_contact(&self, identifier: &str, parent_group: Option<&str>) -> PresenceResult<Contact> {
        let list = self.ctx.contact_list();
        let subscriptions = SubscriptionService::new(self.ctx);

        let parent = parent_group
            .and_then(|name| list.find_group(name))
            .unwrap_or_else(|| list.root_group());

        let mut contact = list.create_unresolved_contact(&parent.name, identifier, None)?;
        contact.awaiting_authorization = true;
        contact.structural_parent = Some(parent.name.clone());
        list.update_contact(&contact)?;

        let awaiting = subscriptions.ensure_awaiting_group();
        list.relocate_contact(identifier, &awaiting.name)?;

        info!(from = %parent.name, to = %awaiting.name, "Contact awaiting authorization");
        self.ctx
            .listeners()
            .fire_subscription_moved(&SubscriptionMovedEvent::new(contact.clone(), parent, awaiting));
        Ok(contact)
    }

    /// Move a contact out of the awaiting authorization group back to the
    /// group it belongs to on the server
    fn release_contact(&self, mut contact: Contact) -> PresenceResult<Contact> {
        let list = self.ctx.contact_list();
        let subscriptions = SubscriptionService::new(self.ctx);

        let awaiting = list
            .parent_group(&contact.identifier)
            .filter(|group| group.name == subscriptions.awaiting_group_name());

        contact.awaiting_authorization = false;
        contact.resolved = true;
        let origin_name = contact.structural_parent.take();
        list.update_contact(&contact)?;

        let Some(awaiting) = awaiting else {
            return Ok(contact);
        };

        let origin = origin_name
            .and_then(|name| list.find_group(&name))
            .unwrap_or_else(|| list.root_group());
        list.relocate_contact(&contact.identifier, &origin.name)?;

        info!(identifier = %contact.identifier, to = %origin.name, "Contact authorized");
        self.ctx
            .listeners()
            .fire_subscription_moved(&SubscriptionMovedEvent::new(contact.clone(), awaiting, origin));
        Ok(contact)
    }
}
