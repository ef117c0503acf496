//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the map of live session documents. Each session has its
//! last-writer-wins document, the connected subscribers, and a last-write
//! stamp consumed by the idle sweeper.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use protocol::{SessionDoc, SessionId, StoreEvent};
use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

// =============================================================================
// SESSION STATE
// =============================================================================

/// Per-session live state. Kept in memory; evicted by the idle sweeper
/// once no subscriber remains and the TTL has elapsed.
pub struct SessionState {
    /// The shared document, merged per field.
    pub doc: SessionDoc,
    /// Connected subscribers: `subscriber_id` -> sender for outgoing events.
    pub subscribers: HashMap<Uuid, mpsc::Sender<StoreEvent>>,
    /// When the document was last mutated.
    pub last_write: Instant,
}

impl SessionState {
    #[must_use]
    pub fn new() -> Self {
        Self { doc: SessionDoc::default(), subscribers: HashMap::new(), last_write: Instant::now() }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// APP STATE
// =============================================================================

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum — the session map is Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<RwLock<HashMap<SessionId, SessionState>>>,
}

impl AppState {
    #[must_use]
    pub fn new() -> Self {
        Self { sessions: Arc::new(RwLock::new(HashMap::new())) }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use super::*;

    pub fn session_id(raw: &str) -> SessionId {
        raw.parse().expect("valid session id")
    }

    /// Seed an empty session and return its id.
    pub async fn seed_session(state: &AppState, raw: &str) -> SessionId {
        let id = session_id(raw);
        let mut sessions = state.sessions.write().await;
        sessions.insert(id.clone(), SessionState::new());
        id
    }

    /// Back-date a session's last write, for sweeper tests.
    pub async fn age_session(state: &AppState, id: &SessionId, age: std::time::Duration) {
        let mut sessions = state.sessions.write().await;
        if let Some(session) = sessions.get_mut(id) {
            session.last_write = Instant::now() - age;
        }
    }

    pub async fn session_exists(state: &AppState, id: &SessionId) -> bool {
        state.sessions.read().await.contains_key(id)
    }

    pub async fn current_doc(state: &AppState, id: &SessionId) -> Option<SessionDoc> {
        state.sessions.read().await.get(id).map(|s| s.doc.clone())
    }
}
