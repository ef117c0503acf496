use protocol::PcState;

use super::*;
use crate::services::document::publish_snapshot;
use crate::state::test_helpers::session_id;

#[tokio::test]
async fn subscribe_delivers_the_current_document_first() {
    let state = AppState::new();
    let id = session_id("demo");
    publish_snapshot(
        &state,
        &id,
        PcState { scene: 3, deco_list: vec![], selected_ids: vec![] },
    )
    .await;

    let (tx, mut rx) = mpsc::channel(16);
    subscribe(&state, &id, Uuid::new_v4(), tx).await;

    match rx.recv().await {
        Some(StoreEvent::Changed { doc }) => assert_eq!(doc.pc_state.unwrap().scene, 3),
        other => panic!("expected resume changed event, got {other:?}"),
    }
}

#[tokio::test]
async fn subscribe_to_a_fresh_session_resumes_from_the_empty_document() {
    let state = AppState::new();
    let id = session_id("fresh");

    let (tx, mut rx) = mpsc::channel(16);
    subscribe(&state, &id, Uuid::new_v4(), tx).await;

    match rx.recv().await {
        Some(StoreEvent::Changed { doc }) => {
            assert!(doc.pc_state.is_none());
            assert!(doc.command.is_none());
        }
        other => panic!("expected resume changed event, got {other:?}"),
    }
}

#[tokio::test]
async fn unsubscribed_senders_receive_nothing_further() {
    let state = AppState::new();
    let id = session_id("demo");
    let subscriber = Uuid::new_v4();

    let (tx, mut rx) = mpsc::channel(16);
    subscribe(&state, &id, subscriber, tx).await;
    let _resume = rx.recv().await;

    unsubscribe(&state, &id, subscriber).await;
    publish_snapshot(
        &state,
        &id,
        PcState { scene: 0, deco_list: vec![], selected_ids: vec![] },
    )
    .await;

    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn unsubscribe_retains_the_document() {
    let state = AppState::new();
    let id = session_id("demo");
    let subscriber = Uuid::new_v4();

    let (tx, _rx) = mpsc::channel(16);
    subscribe(&state, &id, subscriber, tx).await;
    publish_snapshot(
        &state,
        &id,
        PcState { scene: 1, deco_list: vec![], selected_ids: vec![] },
    )
    .await;
    unsubscribe(&state, &id, subscriber).await;

    let sessions = state.sessions.read().await;
    let entry = sessions.get(&id).unwrap();
    assert!(entry.subscribers.is_empty());
    assert_eq!(entry.doc.pc_state.as_ref().unwrap().scene, 1);
}

#[tokio::test]
async fn full_subscriber_channel_drops_the_event_without_blocking() {
    let state = AppState::new();
    let id = session_id("demo");

    // Capacity 1 is consumed by the resume event.
    let (tx, mut rx) = mpsc::channel(1);
    subscribe(&state, &id, Uuid::new_v4(), tx).await;

    publish_snapshot(
        &state,
        &id,
        PcState { scene: 7, deco_list: vec![], selected_ids: vec![] },
    )
    .await;

    // Only the resume event made it; the mutation was dropped, not queued.
    assert!(matches!(rx.recv().await, Some(StoreEvent::Changed { doc }) if doc.pc_state.is_none()));
    assert!(rx.try_recv().is_err());
}
