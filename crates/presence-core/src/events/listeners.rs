//! Listener traits implemented by the application
//!
//! Callbacks run synchronously on the thread that produced the event and
//! must not block.

use super::presence_event::{
    ContactPresenceStatusChangeEvent, ContactPropertyChangeEvent,
    ProviderPresenceStatusChangeEvent, ServerStoredGroupEvent, StatusMessageChangeEvent,
    SubscriptionEvent, SubscriptionMovedEvent,
};

/// Receives presence changes of contacts
pub trait ContactPresenceStatusListener: Send + Sync {
    fn contact_presence_status_changed(&self, event: &ContactPresenceStatusChangeEvent);
}

/// Receives subscription lifecycle events
pub trait SubscriptionListener: Send + Sync {
    fn subscription_changed(&self, event: &SubscriptionEvent);

    fn subscription_moved(&self, _event: &SubscriptionMovedEvent) {}

    fn contact_modified(&self, _event: &ContactPropertyChangeEvent) {}
}

/// Receives changes of our own status and status message
pub trait ProviderPresenceStatusListener: Send + Sync {
    fn provider_status_changed(&self, event: &ProviderPresenceStatusChangeEvent);

    fn provider_status_message_changed(&self, _event: &StatusMessageChangeEvent) {}
}

/// Receives changes to groups of the contact list tree
pub trait ServerStoredGroupListener: Send + Sync {
    fn group_changed(&self, event: &ServerStoredGroupEvent);
}
