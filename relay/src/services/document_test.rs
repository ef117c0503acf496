use protocol::{DecoId, DecoRef};
use tokio::sync::mpsc;
use uuid::Uuid;

use super::*;
use crate::services::session::subscribe;
use crate::state::test_helpers::{current_doc, session_id};

fn snapshot(scene: i32) -> PcState {
    PcState {
        scene,
        deco_list: vec![DecoRef { id: DecoId::from("deco-1"), x_mobile: 0.5, y_mobile: 0.5 }],
        selected_ids: vec![],
    }
}

#[tokio::test]
async fn publish_creates_the_session_document() {
    let state = AppState::new();
    let id = session_id("demo");

    publish_snapshot(&state, &id, snapshot(0)).await;

    let doc = current_doc(&state, &id).await.unwrap();
    assert_eq!(doc.pc_state.unwrap().scene, 0);
    assert!(doc.command.is_none());
}

#[tokio::test]
async fn publish_never_clobbers_the_outstanding_command() {
    let state = AppState::new();
    let id = session_id("demo");

    send_command_at(&state, &id, Command::DeleteMulti, 1_000).await;
    publish_snapshot(&state, &id, snapshot(2)).await;

    let doc = current_doc(&state, &id).await.unwrap();
    assert_eq!(doc.command.unwrap().command, Command::DeleteMulti);
    assert_eq!(doc.pc_state.unwrap().scene, 2);
}

#[tokio::test]
async fn command_overwrites_the_previous_one() {
    let state = AppState::new();
    let id = session_id("demo");

    send_command_at(&state, &id, Command::DeleteMulti, 1_000).await;
    send_command_at(&state, &id, Command::SelectMulti { ids: vec![] }, 2_000).await;

    let doc = current_doc(&state, &id).await.unwrap();
    assert_eq!(doc.command.unwrap().command, Command::SelectMulti { ids: vec![] });
}

#[tokio::test]
async fn stamps_are_strictly_monotonic_within_one_millisecond() {
    let state = AppState::new();
    let id = session_id("demo");

    send_command_at(&state, &id, Command::DeleteMulti, 1_000).await;
    send_command_at(&state, &id, Command::DeleteMulti, 1_000).await;
    send_command_at(&state, &id, Command::DeleteMulti, 1_000).await;

    let doc = current_doc(&state, &id).await.unwrap();
    assert_eq!(doc.command.unwrap().timestamp, 1_002);
}

#[tokio::test]
async fn stamps_survive_a_clock_regression() {
    let state = AppState::new();
    let id = session_id("demo");

    send_command_at(&state, &id, Command::DeleteMulti, 5_000).await;
    send_command_at(&state, &id, Command::DeleteMulti, 3_000).await;

    let doc = current_doc(&state, &id).await.unwrap();
    assert_eq!(doc.command.unwrap().timestamp, 5_001);
}

#[tokio::test]
async fn stamps_follow_the_clock_when_it_is_ahead() {
    let state = AppState::new();
    let id = session_id("demo");

    send_command_at(&state, &id, Command::DeleteMulti, 1_000).await;
    send_command_at(&state, &id, Command::DeleteMulti, 9_000).await;

    let doc = current_doc(&state, &id).await.unwrap();
    assert_eq!(doc.command.unwrap().timestamp, 9_000);
}

#[tokio::test]
async fn mutations_fan_out_to_subscribers_in_write_order() {
    let state = AppState::new();
    let id = session_id("demo");
    let (tx, mut rx) = mpsc::channel(16);

    subscribe(&state, &id, Uuid::new_v4(), tx).await;
    // Resume event for the empty document.
    assert!(matches!(rx.recv().await, Some(StoreEvent::Changed { doc }) if doc.pc_state.is_none()));

    publish_snapshot(&state, &id, snapshot(0)).await;
    send_command_at(&state, &id, Command::DeleteMulti, 1_000).await;

    let first = rx.recv().await.unwrap();
    assert!(matches!(first, StoreEvent::Changed { ref doc } if doc.command.is_none()));
    let second = rx.recv().await.unwrap();
    assert!(matches!(second, StoreEvent::Changed { ref doc } if doc.command.is_some()));
}
