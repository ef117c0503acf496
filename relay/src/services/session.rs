//! Session service — subscriber registry and event fan-out.
//!
//! DESIGN
//! ======
//! Subscribers register a bounded mpsc sender and first receive a
//! `changed` event carrying the current document, so a reconnecting
//! client resumes from the latest state without a separate fetch path.
//! Fan-out is best-effort `try_send`: events carry the full leveled
//! document, so a dropped event is recovered by the next one and a slow
//! subscriber never blocks the hub.

use protocol::{SessionId, StoreEvent};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{info, warn};
use uuid::Uuid;

use crate::state::{AppState, SessionState};

/// Register a subscriber. Delivers the resume `changed` event before the
/// sender joins the fan-out set, so the first event a subscriber sees is
/// always the current document.
pub async fn subscribe(
    state: &AppState,
    session: &SessionId,
    subscriber: Uuid,
    tx: mpsc::Sender<StoreEvent>,
) {
    let mut sessions = state.sessions.write().await;
    let entry = sessions.entry(session.clone()).or_default();
    deliver(subscriber, &tx, &StoreEvent::Changed { doc: entry.doc.clone() });
    entry.subscribers.insert(subscriber, tx);
    info!(%session, %subscriber, subscribers = entry.subscribers.len(), "subscriber joined");
}

/// Remove a subscriber. The document is retained so a reconnect resumes
/// from the latest state; eviction is the sweeper's job.
pub async fn unsubscribe(state: &AppState, session: &SessionId, subscriber: Uuid) {
    let mut sessions = state.sessions.write().await;
    if let Some(entry) = sessions.get_mut(session) {
        entry.subscribers.remove(&subscriber);
        info!(%session, %subscriber, subscribers = entry.subscribers.len(), "subscriber left");
    }
}

/// Fan one event out to every subscriber of a session. Called with the
/// session write lock held.
pub fn notify(entry: &SessionState, event: &StoreEvent) {
    for (subscriber, tx) in &entry.subscribers {
        deliver(*subscriber, tx, event);
    }
}

fn deliver(subscriber: Uuid, tx: &mpsc::Sender<StoreEvent>, event: &StoreEvent) {
    match tx.try_send(event.clone()) {
        Ok(()) => {}
        Err(TrySendError::Full(_)) => {
            warn!(%subscriber, "subscriber channel full; dropping event");
        }
        Err(TrySendError::Closed(_)) => {
            warn!(%subscriber, "subscriber channel closed; dropping event");
        }
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
