//! Authorization handshake scenarios
//!
//! Run with: cargo test -p integration-tests --test authorization_tests

use futures::future::join_all;
use integration_tests::{fixtures::*, TestProvider};
use presence_core::{
    AuthorizationResponse, AuthorizationResponseCode, GroupEventKind, ProtocolCommand,
    ProtocolEvent, SubscriptionEventKind,
};
use presence_service::testing::ListOperation;

#[tokio::test]
async fn test_required_authorization_parks_contact() {
    let provider = TestProvider::start().await.unwrap();
    let identifier = unique_identifier();

    assert!(provider
        .require_authorization(&identifier, Some(WORK))
        .await
        .unwrap());

    let contact = provider.provider.find_contact_by_id(&identifier).unwrap();
    assert!(contact.awaiting_authorization);
    assert_eq!(provider.contacts.group_of(&identifier).as_deref(), Some(AWAITING));

    let moves = provider.listener.moves.lock().clone();
    assert_eq!(moves.len(), 1);
    assert_eq!(moves[0].old_parent.name, WORK);
    assert_eq!(moves[0].new_parent.name, AWAITING);

    let commands = provider.protocol.commands();
    assert_eq!(commands.len(), 2);
    assert!(matches!(
        &commands[1],
        ProtocolCommand::RequestAuthorization { identifier: id, .. } if *id == identifier
    ));
}

#[tokio::test]
async fn test_awaiting_group_is_created_once_under_concurrent_requests() {
    let provider = TestProvider::start().await.unwrap();
    let identifiers: Vec<String> = (0..8).map(|_| unique_identifier()).collect();

    let results = join_all(
        identifiers
            .iter()
            .map(|identifier| provider.require_authorization(identifier, Some(FRIENDS))),
    )
    .await;
    assert!(results.into_iter().all(|sent| sent.unwrap()));

    let created: Vec<_> = provider
        .listener
        .groups
        .lock()
        .iter()
        .filter(|event| event.kind == GroupEventKind::Created && event.group.name == AWAITING)
        .cloned()
        .collect();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].parent_group.as_ref().map(|g| g.name.as_str()), Some(ROOT));
    assert_eq!(provider.listener.moves.lock().len(), identifiers.len());
}

#[tokio::test]
async fn test_accepted_request_restores_contact() {
    let provider = TestProvider::start().await.unwrap();
    let identifier = unique_identifier();
    provider
        .require_authorization(&identifier, Some(FRIENDS))
        .await
        .unwrap();

    provider
        .emit(ProtocolEvent::AuthorizationAccepted {
            identifier: identifier.clone(),
            reason: None,
        })
        .await
        .unwrap();

    let contact = provider.provider.find_contact_by_id(&identifier).unwrap();
    assert!(!contact.awaiting_authorization);
    assert_eq!(provider.contacts.group_of(&identifier).as_deref(), Some(FRIENDS));

    let moves = provider.listener.moves.lock().clone();
    assert_eq!(moves.len(), 2);
    assert_eq!(moves[1].old_parent.name, AWAITING);
    assert_eq!(moves[1].new_parent.name, FRIENDS);

    let outcomes = provider.handler.outcomes();
    assert_eq!(outcomes, vec![(AuthorizationResponse::accept(), identifier)]);
}

#[tokio::test]
async fn test_denied_request_removes_contact() {
    let provider = TestProvider::start().await.unwrap();
    let identifier = unique_identifier();
    provider
        .require_authorization(&identifier, Some(FRIENDS))
        .await
        .unwrap();

    provider
        .emit(ProtocolEvent::AuthorizationDenied {
            identifier: identifier.clone(),
            reason: Some("who are you".to_string()),
        })
        .await
        .unwrap();

    let outcomes = provider.handler.outcomes();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].0.code, AuthorizationResponseCode::Reject);

    assert_eq!(
        provider.contacts.operations(),
        vec![ListOperation::DeleteContact {
            group: FRIENDS.to_string(),
            identifier: identifier.clone(),
        }]
    );
    assert!(provider.provider.find_contact_by_id(&identifier).is_none());

    let removed = provider.listener.subscriptions.lock().clone();
    assert_eq!(removed.len(), 1);
    assert_eq!(removed[0].kind, SubscriptionEventKind::Removed);
}

#[tokio::test]
async fn test_incoming_request_from_stranger() {
    let provider = TestProvider::start().await.unwrap();
    let stranger = unique_identifier();
    provider
        .handler
        .answer_incoming_with(AuthorizationResponse::reject("not now"));

    provider
        .emit(ProtocolEvent::AuthorizationRequestReceived {
            identifier: stranger.clone(),
            reason: "add me".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(provider.handler.decisions(), vec![stranger.clone()]);
    let contact = provider.provider.find_contact_by_id(&stranger).unwrap();
    assert!(!contact.persistent);
    assert_eq!(
        provider.protocol.commands(),
        vec![ProtocolCommand::AuthorizationReply {
            identifier: stranger,
            accepted: false,
            reason: Some("not now".to_string()),
        }]
    );
}

#[tokio::test]
async fn test_informational_notifications_change_nothing() {
    let provider = TestProvider::start().await.unwrap();

    provider
        .emit(ProtocolEvent::FutureAuthorizationGranted {
            identifier: ALICE.to_string(),
            reason: "sure".to_string(),
        })
        .await
        .unwrap();
    provider
        .emit(ProtocolEvent::YouWereAdded {
            identifier: BOB.to_string(),
        })
        .await
        .unwrap();

    assert!(provider.protocol.commands().is_empty());
    assert!(provider.listener.moves.lock().is_empty());
    assert!(provider.listener.subscriptions.lock().is_empty());
}

#[tokio::test]
async fn test_unsubscribing_awaiting_contact_deletes_from_original_group() {
    let provider = TestProvider::start().await.unwrap();
    let identifier = unique_identifier();
    provider
        .require_authorization(&identifier, Some(WORK))
        .await
        .unwrap();
    let contact = provider.provider.find_contact_by_id(&identifier).unwrap();

    let err = provider
        .provider
        .move_contact_to_group(&contact, FRIENDS)
        .await
        .unwrap_err();
    assert!(err.is_invalid_argument());

    provider.provider.unsubscribe(&contact).await.unwrap();
    assert_eq!(
        provider.contacts.operations(),
        vec![ListOperation::DeleteContact {
            group: WORK.to_string(),
            identifier,
        }]
    );
}
