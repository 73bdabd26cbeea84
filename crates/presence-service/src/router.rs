//! Routes protocol notifications to the services

use async_trait::async_trait;
use std::sync::Arc;
use tracing::trace;

use presence_core::traits::ProtocolEventHandler;
use presence_core::ProtocolEvent;

use crate::services::{AuthorizationService, PresenceService, ServiceContext};

/// Protocol event handler handed to the protocol stack on registration
pub struct ProtocolEventRouter {
    ctx: Arc<ServiceContext>,
}

impl ProtocolEventRouter {
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl ProtocolEventHandler for ProtocolEventRouter {
    async fn handle_event(&self, event: ProtocolEvent) {
        trace!(event_type = event.event_type(), "Protocol event");

        let presence = PresenceService::new(&self.ctx);
        let authorization = AuthorizationService::new(&self.ctx);

        match event {
            ProtocolEvent::OwnInfo(info) => {
                presence.handle_own_info(&info);
            }
            ProtocolEvent::OwnExtraInfo { status_message } => {
                presence.handle_own_status_message(status_message.as_deref());
            }
            ProtocolEvent::BuddyStatus(info) => {
                presence.handle_buddy_status(&info);
            }
            ProtocolEvent::BuddyOffline { identifier } => {
                presence.handle_buddy_offline(&identifier);
            }
            ProtocolEvent::BuddyIcon { identifier, icon } => {
                presence.handle_buddy_icon(&identifier, icon);
            }
            ProtocolEvent::AuthorizationRequestReceived { identifier, reason } => {
                authorization
                    .authorization_request_received(&identifier, &reason)
                    .await;
            }
            ProtocolEvent::AuthorizationAccepted { identifier, reason } => {
                authorization.authorization_accepted(&identifier, reason);
            }
            ProtocolEvent::AuthorizationDenied { identifier, reason } => {
                authorization.authorization_denied(&identifier, reason).await;
            }
            ProtocolEvent::FutureAuthorizationGranted { identifier, reason } => {
                authorization.future_authorization_granted(&identifier, &reason);
            }
            ProtocolEvent::YouWereAdded { identifier } => {
                authorization.you_were_added(&identifier);
            }
        }
    }

    async fn authorization_required(&self, identifier: &str, parent_group: Option<&str>) -> bool {
        AuthorizationService::new(&self.ctx)
            .authorization_required(identifier, parent_group)
            .await
    }
}
