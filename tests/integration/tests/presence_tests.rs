//! Own and buddy presence, end to end through the protocol router
//!
//! Run with: cargo test -p integration-tests --test presence_tests

use integration_tests::{fixtures::*, test_config, TestProvider};
use presence_core::{
    AccountMode, PresenceStatus, ProtocolCommand, ProtocolEvent, ProtocolRequest, StatusBitmask,
    StatusFlags, UserInfo,
};
use presence_service::testing::QueryBehavior;

// ============================================================================
// Own status
// ============================================================================

#[tokio::test]
async fn test_published_status_takes_effect_on_server_confirmation() {
    let provider = TestProvider::start().await.unwrap();

    provider
        .provider
        .publish_presence_status(PresenceStatus::Away, "back soon")
        .await
        .unwrap();
    assert_eq!(provider.provider.presence_status(), PresenceStatus::Offline);
    assert!(provider.listener.provider_status.lock().is_empty());

    provider
        .emit(ProtocolEvent::OwnInfo(own_info(StatusFlags::ONLINE | StatusFlags::AWAY)))
        .await
        .unwrap();
    provider
        .emit(ProtocolEvent::OwnInfo(own_info(StatusFlags::ONLINE | StatusFlags::AWAY)))
        .await
        .unwrap();

    assert_eq!(provider.provider.presence_status(), PresenceStatus::Away);
    let events = provider.listener.provider_status.lock().clone();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].old_status, PresenceStatus::Offline);
    assert_eq!(events[0].new_status, PresenceStatus::Away);
}

#[tokio::test]
async fn test_leaving_invisible_fires_one_change() {
    let provider = TestProvider::start().await.unwrap();
    provider
        .emit(ProtocolEvent::OwnInfo(own_info(StatusFlags::ONLINE | StatusFlags::INVISIBLE)))
        .await
        .unwrap();
    provider.listener.provider_status.lock().clear();

    provider
        .provider
        .publish_presence_status(PresenceStatus::Online, "")
        .await
        .unwrap();
    assert_eq!(provider.provider.presence_status(), PresenceStatus::Invisible);

    for _ in 0..2 {
        provider
            .emit(ProtocolEvent::OwnInfo(own_info(StatusFlags::ONLINE)))
            .await
            .unwrap();
    }

    let events = provider.listener.provider_status.lock().clone();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].old_status, PresenceStatus::Invisible);
    assert_eq!(events[0].new_status, PresenceStatus::Online);
}

#[tokio::test]
async fn test_publish_self_queries_local_account() {
    let provider = TestProvider::start().await.unwrap();
    provider
        .provider
        .publish_presence_status(PresenceStatus::DoNotDisturb, "")
        .await
        .unwrap();

    assert_eq!(
        provider.protocol.requests(),
        vec![ProtocolRequest::UserInfo {
            identifier: provider.provider.local_contact().identifier,
        }]
    );
}

#[tokio::test]
async fn test_highest_priority_flag_wins() {
    let provider = TestProvider::start().await.unwrap();
    provider
        .emit(ProtocolEvent::OwnInfo(own_info(
            StatusFlags::ONLINE | StatusFlags::AWAY | StatusFlags::DND | StatusFlags::INVISIBLE,
        )))
        .await
        .unwrap();
    assert_eq!(provider.provider.presence_status(), PresenceStatus::Invisible);

    provider
        .emit(ProtocolEvent::OwnInfo(own_info(StatusFlags::ONLINE | StatusFlags::NA | StatusFlags::AWAY)))
        .await
        .unwrap();
    assert_eq!(provider.provider.presence_status(), PresenceStatus::NotAvailable);
}

#[tokio::test]
async fn test_status_message_report_is_deduplicated() {
    let provider = TestProvider::start().await.unwrap();

    for message in ["at lunch", "at lunch", "working"] {
        provider
            .emit(ProtocolEvent::OwnExtraInfo {
                status_message: Some(message.to_string()),
            })
            .await
            .unwrap();
    }

    assert_eq!(provider.provider.current_status_message(), "working");
    let events = provider.listener.status_messages.lock().clone();
    assert_eq!(events.len(), 2);
    assert_eq!(events[1].old_message, "at lunch");
}

#[tokio::test]
async fn test_publish_offline_is_rejected() {
    let provider = TestProvider::start().await.unwrap();
    let err = provider
        .provider
        .publish_presence_status(PresenceStatus::Offline, "")
        .await
        .unwrap_err();
    assert!(err.is_invalid_argument());
    assert!(provider.protocol.commands().is_empty());
}

#[tokio::test]
async fn test_basic_account_publishes_away_message() {
    let mut config = test_config().unwrap();
    config.account.mode = AccountMode::Basic;
    let provider = TestProvider::start_with(config, standard_contact_list())
        .await
        .unwrap();

    let supported: Vec<_> = provider.provider.supported_status_set().collect();
    assert!(supported.contains(&PresenceStatus::Away));
    assert!(!supported.contains(&PresenceStatus::DoNotDisturb));

    provider
        .provider
        .publish_presence_status(PresenceStatus::Away, "")
        .await
        .unwrap();
    assert_eq!(
        provider.protocol.commands(),
        vec![ProtocolCommand::SetAwayMessage {
            message: Some("I'm away!".to_string())
        }]
    );

    let err = provider
        .provider
        .publish_presence_status(PresenceStatus::FreeForChat, "")
        .await
        .unwrap_err();
    assert!(err.is_invalid_argument());
}

// ============================================================================
// Buddy status
// ============================================================================

#[tokio::test]
async fn test_buddy_reports_update_contacts() {
    let provider = TestProvider::start().await.unwrap();

    provider
        .emit(ProtocolEvent::BuddyStatus(buddy(BOB, StatusFlags::ONLINE | StatusFlags::OCCUPIED)))
        .await
        .unwrap();
    provider
        .emit(ProtocolEvent::BuddyOffline {
            identifier: ALICE.to_string(),
        })
        .await
        .unwrap();
    provider
        .emit(ProtocolEvent::BuddyOffline {
            identifier: ALICE.to_string(),
        })
        .await
        .unwrap();

    let events = provider.listener.contact_presence.lock().clone();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].contact.identifier, BOB);
    assert_eq!(events[0].new_status, PresenceStatus::Occupied);
    assert_eq!(events[0].parent_group.as_ref().map(|g| g.name.as_str()), Some(FRIENDS));
    assert_eq!(events[1].contact.identifier, ALICE);
    assert_eq!(events[1].new_status, PresenceStatus::Offline);
}

#[tokio::test]
async fn test_reports_for_strangers_are_dropped() {
    let provider = TestProvider::start().await.unwrap();
    let stranger = unique_identifier();

    provider
        .emit(ProtocolEvent::BuddyStatus(UserInfo::new(&stranger, StatusBitmask::ONLINE)))
        .await
        .unwrap();
    provider
        .emit(ProtocolEvent::BuddyIcon {
            identifier: stranger.clone(),
            icon: Some(vec![0; 16]),
        })
        .await
        .unwrap();

    assert!(provider.listener.contact_presence.lock().is_empty());
    assert!(provider.listener.modifications.lock().is_empty());
    assert!(provider.provider.find_contact_by_id(&stranger).is_none());
}

#[tokio::test]
async fn test_buddy_icon_is_stored() {
    let provider = TestProvider::start().await.unwrap();
    provider
        .emit(ProtocolEvent::BuddyIcon {
            identifier: CAROL.to_string(),
            icon: Some(vec![7; 32]),
        })
        .await
        .unwrap();

    let contact = provider.provider.find_contact_by_id(CAROL).unwrap();
    assert_eq!(contact.image.as_deref().map(<[u8]>::len), Some(32));
    let modifications = provider.listener.modifications.lock().clone();
    assert_eq!(modifications.len(), 1);
    assert_eq!(modifications[0].property, "image");
}

// ============================================================================
// Status queries
// ============================================================================

#[tokio::test]
async fn test_query_reads_server_answer() {
    let provider = TestProvider::start().await.unwrap();
    provider
        .protocol
        .set_status(CAROL, StatusBitmask::from_flags(StatusFlags::ONLINE | StatusFlags::FREE_FOR_CHAT));
    provider.protocol.set_status(BOB, StatusBitmask::UNKNOWN);

    assert_eq!(
        provider.provider.query_contact_status(CAROL).await.unwrap(),
        PresenceStatus::FreeForChat
    );
    assert_eq!(
        provider.provider.query_contact_status(BOB).await.unwrap(),
        PresenceStatus::Online
    );
    assert_eq!(
        provider.provider.query_contact_status(&unique_identifier()).await.unwrap(),
        PresenceStatus::Offline
    );
}

#[tokio::test(start_paused = true)]
async fn test_silent_server_query_times_out_offline() {
    let provider = TestProvider::start().await.unwrap();
    provider.protocol.set_behavior(ALICE, QueryBehavior::Silent);

    let started = tokio::time::Instant::now();
    let status = provider.provider.query_contact_status(ALICE).await.unwrap();

    assert_eq!(status, PresenceStatus::Offline);
    assert!(started.elapsed() >= std::time::Duration::from_millis(500));
    assert_eq!(provider.protocol.deliver_pending(&presence_core::ProtocolResponse::UserInfo(
        UserInfo::new(ALICE, StatusBitmask::ONLINE),
    )), 1);
}

#[tokio::test]
async fn test_operations_fail_when_disconnected() {
    let provider = TestProvider::start().await.unwrap();
    provider.disconnect().await;

    assert!(provider
        .provider
        .query_contact_status(ALICE)
        .await
        .unwrap_err()
        .is_not_connected());
    assert!(provider
        .provider
        .set_status_message("hello")
        .await
        .unwrap_err()
        .is_not_connected());
}
