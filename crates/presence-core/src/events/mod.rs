//! Presence events and listener traits

mod listeners;
mod presence_event;

pub use listeners::{
    ContactPresenceStatusListener, ProviderPresenceStatusListener, ServerStoredGroupListener,
    SubscriptionListener,
};
pub use presence_event::{
    ContactPresenceStatusChangeEvent, ContactPropertyChangeEvent, GroupEventKind,
    ProviderPresenceStatusChangeEvent, ServerStoredGroupEvent, StatusMessageChangeEvent,
    SubscriptionEvent, SubscriptionEventKind, SubscriptionMovedEvent,
};
