//! The four listener registries of a presence provider

use std::sync::Arc;

use super::registry::ListenerRegistry;
use crate::events::{
    ContactPresenceStatusChangeEvent, ContactPresenceStatusListener, ContactPropertyChangeEvent,
    ProviderPresenceStatusChangeEvent, ProviderPresenceStatusListener, ServerStoredGroupEvent,
    ServerStoredGroupListener, StatusMessageChangeEvent, SubscriptionEvent, SubscriptionListener,
    SubscriptionMovedEvent,
};

/// Listener registries shared by the engine and the contact list
///
/// Each registry is independent; registering in one has no effect on the
/// others.
#[derive(Debug, Default)]
pub struct ListenerHub {
    contact_presence: ListenerRegistry<dyn ContactPresenceStatusListener>,
    subscription: ListenerRegistry<dyn SubscriptionListener>,
    provider_presence: ListenerRegistry<dyn ProviderPresenceStatusListener>,
    group_change: ListenerRegistry<dyn ServerStoredGroupListener>,
}

impl ListenerHub {
    pub fn new() -> Self {
        Self::default()
    }

    // === Registries ===

    pub fn contact_presence(&self) -> &ListenerRegistry<dyn ContactPresenceStatusListener> {
        &self.contact_presence
    }

    pub fn subscription(&self) -> &ListenerRegistry<dyn SubscriptionListener> {
        &self.subscription
    }

    pub fn provider_presence(&self) -> &ListenerRegistry<dyn ProviderPresenceStatusListener> {
        &self.provider_presence
    }

    pub fn group_change(&self) -> &ListenerRegistry<dyn ServerStoredGroupListener> {
        &self.group_change
    }

    // === Dispatch ===

    pub fn fire_contact_presence_changed(&self, event: &ContactPresenceStatusChangeEvent) -> usize {
        self.contact_presence
            .dispatch(|listener| listener.contact_presence_status_changed(event))
    }

    pub fn fire_subscription_changed(&self, event: &SubscriptionEvent) -> usize {
        self.subscription
            .dispatch(|listener| listener.subscription_changed(event))
    }

    pub fn fire_subscription_moved(&self, event: &SubscriptionMovedEvent) -> usize {
        self.subscription
            .dispatch(|listener| listener.subscription_moved(event))
    }

    pub fn fire_contact_modified(&self, event: &ContactPropertyChangeEvent) -> usize {
        self.subscription
            .dispatch(|listener| listener.contact_modified(event))
    }

    pub fn fire_provider_status_changed(&self, event: &ProviderPresenceStatusChangeEvent) -> usize {
        self.provider_presence
            .dispatch(|listener| listener.provider_status_changed(event))
    }

    pub fn fire_status_message_changed(&self, event: &StatusMessageChangeEvent) -> usize {
        self.provider_presence
            .dispatch(|listener| listener.provider_status_message_changed(event))
    }

    pub fn fire_group_changed(&self, event: &ServerStoredGroupEvent) -> usize {
        self.group_change
            .dispatch(|listener| listener.group_changed(event))
    }
}

/// Shared handle to a listener hub
pub type SharedListenerHub = Arc<ListenerHub>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::PresenceStatus;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<(PresenceStatus, PresenceStatus)>>);

    impl ProviderPresenceStatusListener for Recorder {
        fn provider_status_changed(&self, event: &ProviderPresenceStatusChangeEvent) {
            self.0.lock().push((event.old_status, event.new_status));
        }
    }

    #[test]
    fn test_registries_are_independent() {
        let hub = ListenerHub::new();
        let recorder = Arc::new(Recorder::default());
        hub.provider_presence().add(recorder.clone());

        assert_eq!(hub.provider_presence().len(), 1);
        assert!(hub.contact_presence().is_empty());
        assert!(hub.subscription().is_empty());
        assert!(hub.group_change().is_empty());
    }

    #[test]
    fn test_fire_provider_status_changed() {
        let hub = ListenerHub::new();
        let recorder = Arc::new(Recorder::default());
        hub.provider_presence().add(recorder.clone());

        let delivered = hub.fire_provider_status_changed(&ProviderPresenceStatusChangeEvent::new(
            PresenceStatus::Offline,
            PresenceStatus::Online,
        ));

        assert_eq!(delivered, 1);
        assert_eq!(
            *recorder.0.lock(),
            vec![(PresenceStatus::Offline, PresenceStatus::Online)]
        );
    }

    #[test]
    fn test_status_message_uses_default_noop() {
        let hub = ListenerHub::new();
        hub.provider_presence().add(Arc::new(Recorder::default()));
        let delivered = hub.fire_status_message_changed(&StatusMessageChangeEvent::new("", "hi"));
        assert_eq!(delivered, 1);
    }
}
