//! WebSocket handler — store requests in, store events out.
//!
//! DESIGN
//! ======
//! The session id travels in the query string and is validated before the
//! upgrade: a missing or invalid id is a configuration error on the
//! client's side and gets HTTP 400, never a half-open socket. On upgrade
//! the connection subscribes to its session and enters a `select!` loop:
//! - Inbound text frames → parse as `StoreRequest` → hub mutation
//! - Hub events from the subscription channel → forward to the socket
//!
//! Malformed inbound JSON is logged and ignored; one bad frame never
//! poisons the connection. Socket close unsubscribes.

use std::collections::HashMap;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use protocol::{SessionId, StoreEvent, StoreRequest};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::services;
use crate::state::AppState;

/// Outbound event buffer per subscriber. Overflow drops events (leveled
/// documents make that safe) instead of back-pressuring the hub.
const SUBSCRIBER_BUFFER: usize = 256;

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    ws: WebSocketUpgrade,
) -> Response {
    let Some(raw) = params.get("session") else {
        return (StatusCode::BAD_REQUEST, "session required").into_response();
    };

    let session: SessionId = match raw.parse() {
        Ok(id) => id,
        Err(e) => {
            warn!(error = %e, "ws: rejected session id");
            return (StatusCode::BAD_REQUEST, "invalid session id").into_response();
        }
    };

    ws.on_upgrade(move |socket| run_ws(socket, state, session))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState, session: SessionId) {
    let subscriber = Uuid::new_v4();
    let (tx, mut rx) = mpsc::channel::<StoreEvent>(SUBSCRIBER_BUFFER);

    services::session::subscribe(&state, &session, subscriber, tx).await;
    info!(%session, %subscriber, "ws: client connected");

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(msg) = msg else { break };
                let Ok(msg) = msg else { break };
                match msg {
                    Message::Text(text) => {
                        dispatch_request(&state, &session, subscriber, &text).await;
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            Some(event) = rx.recv() => {
                if send_event(&mut socket, &event).await.is_err() {
                    break;
                }
            }
        }
    }

    services::session::unsubscribe(&state, &session, subscriber).await;
    info!(%session, %subscriber, "ws: client disconnected");
}

// =============================================================================
// REQUEST DISPATCH
// =============================================================================

/// Parse one inbound text frame and apply it to the hub. Failures are
/// isolated to the frame.
async fn dispatch_request(state: &AppState, session: &SessionId, subscriber: Uuid, text: &str) {
    let request: StoreRequest = match serde_json::from_str(text) {
        Ok(request) => request,
        Err(e) => {
            warn!(%subscriber, error = %e, "ws: malformed request; ignored");
            return;
        }
    };

    match request {
        StoreRequest::PublishSnapshot { pc_state } => {
            services::document::publish_snapshot(state, session, pc_state).await;
        }
        StoreRequest::SendCommand { command } => {
            services::document::send_command(state, session, command).await;
        }
    }
}

async fn send_event(socket: &mut WebSocket, event: &StoreEvent) -> Result<(), ()> {
    let json = match serde_json::to_string(event) {
        Ok(json) => json,
        Err(e) => {
            warn!(error = %e, "ws: failed to serialize event");
            return Err(());
        }
    };
    socket.send(Message::Text(json.into())).await.map_err(|_| ())
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;
