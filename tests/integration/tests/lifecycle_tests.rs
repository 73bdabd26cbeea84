//! Registration lifecycle, the awaiting authorization poller, and
//! listener registries
//!
//! Run with: cargo test -p integration-tests --test lifecycle_tests

use std::sync::Arc;
use std::time::Duration;

use integration_tests::{fixtures::*, TestProvider};
use presence_core::{
    ContactPresenceStatusListener, PresenceStatus, ProtocolEvent, StatusBitmask, StatusFlags,
};
use presence_service::testing::RecordingListener;

#[tokio::test]
async fn test_disconnect_marks_everyone_offline() {
    let provider = TestProvider::start().await.unwrap();
    provider
        .emit(ProtocolEvent::OwnInfo(own_info(StatusFlags::ONLINE)))
        .await
        .unwrap();

    provider.disconnect().await;

    assert_eq!(provider.provider.presence_status(), PresenceStatus::Offline);
    let own = provider.listener.provider_status.lock().clone();
    assert_eq!(own.len(), 2);
    assert_eq!(own[1].old_status, PresenceStatus::Online);
    assert_eq!(own[1].new_status, PresenceStatus::Offline);

    let mut changed: Vec<_> = provider
        .listener
        .contact_presence
        .lock()
        .iter()
        .map(|event| (event.contact.identifier.clone(), event.new_status))
        .collect();
    changed.sort();
    assert_eq!(
        changed,
        vec![
            (ALICE.to_string(), PresenceStatus::Offline),
            (CAROL.to_string(), PresenceStatus::Offline),
        ]
    );
    assert!(!provider.provider.is_polling());
}

#[tokio::test(start_paused = true)]
async fn test_poller_re_requests_contact_seen_online() {
    let provider = TestProvider::start().await.unwrap();
    let identifier = unique_identifier();
    provider
        .require_authorization(&identifier, Some(FRIENDS))
        .await
        .unwrap();
    provider.protocol.set_status(&identifier, StatusBitmask::ONLINE);

    tokio::time::sleep(Duration::from_secs(16)).await;
    assert_eq!(provider.extended.calls().len(), 1);
    assert_eq!(provider.extended.calls()[0].0, identifier);

    tokio::time::sleep(Duration::from_secs(240)).await;
    assert_eq!(provider.extended.calls().len(), 1);
    assert_eq!(provider.protocol.requests().len(), 3);

    let seen: Vec<_> = provider
        .listener
        .contact_presence
        .lock()
        .iter()
        .filter(|event| event.contact.identifier == identifier)
        .map(|event| event.new_status)
        .collect();
    assert_eq!(seen, vec![PresenceStatus::Online]);
}

#[tokio::test(start_paused = true)]
async fn test_poller_stops_on_disconnect() {
    let provider = TestProvider::start().await.unwrap();
    let identifier = unique_identifier();
    provider
        .require_authorization(&identifier, None)
        .await
        .unwrap();

    provider.disconnect().await;
    tokio::time::sleep(Duration::from_secs(600)).await;

    assert!(provider.protocol.requests().is_empty());
    assert!(provider.extended.calls().is_empty());
}

#[tokio::test]
async fn test_listener_registered_twice_is_notified_once() {
    let provider = TestProvider::start().await.unwrap();
    let extra = RecordingListener::new();
    let as_listener: Arc<dyn ContactPresenceStatusListener> = extra.clone();

    provider
        .provider
        .add_contact_presence_status_listener(as_listener.clone());
    provider
        .provider
        .add_contact_presence_status_listener(as_listener.clone());
    provider
        .emit(ProtocolEvent::BuddyOffline {
            identifier: ALICE.to_string(),
        })
        .await
        .unwrap();
    assert_eq!(extra.contact_presence.lock().len(), 1);

    provider
        .provider
        .remove_contact_presence_status_listener(&as_listener);
    provider
        .emit(ProtocolEvent::BuddyStatus(buddy(ALICE, StatusFlags::ONLINE)))
        .await
        .unwrap();
    assert_eq!(extra.contact_presence.lock().len(), 1);
    assert_eq!(provider.listener.contact_presence.lock().len(), 2);
}

#[tokio::test]
async fn test_subscribe_flows_through_contact_list_events() {
    let provider = TestProvider::start().await.unwrap();
    let identifier = unique_identifier();

    provider
        .provider
        .subscribe_in_group(WORK, &identifier)
        .await
        .unwrap();
    provider
        .provider
        .create_server_stored_contact_group(ROOT, "Family")
        .await
        .unwrap();

    let subscriptions = provider.listener.subscriptions.lock().clone();
    assert_eq!(subscriptions.len(), 1);
    assert_eq!(subscriptions[0].contact.identifier, identifier);
    assert_eq!(
        subscriptions[0].parent_group.as_ref().map(|g| g.name.as_str()),
        Some(WORK)
    );
    assert_eq!(provider.listener.groups.lock().len(), 1);
}

#[tokio::test]
async fn test_presence_values_serialize_to_json() {
    let provider = TestProvider::start().await.unwrap();
    let status = serde_json::to_value(provider.provider.presence_status()).unwrap();
    assert_eq!(status, serde_json::json!("offline"));

    let contact = serde_json::to_value(provider.provider.local_contact()).unwrap();
    assert_eq!(contact["identifier"], "100200300");
}
