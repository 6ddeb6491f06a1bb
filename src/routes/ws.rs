//! WebSocket handler — fan question and play relay.
//!
//! DESIGN
//! ======
//! On upgrade, the connection probes the completion service. If the probe
//! fails the socket is closed without sending any text frame. Otherwise a
//! `Session` is opened and the handler reads frames until the peer leaves:
//! - `explain_play` → session explainer → `explanation` frame
//! - anything else → contextual Q&A → `text` frame
//!
//! Requests on one connection are handled strictly in arrival order; each
//! gets exactly one reply. Failures never close the socket.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → liveness probe (close on failure)
//! 2. Client sends frames → parse → dispatch → one reply frame
//! 3. Close / receive error / send failure → drop session

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use tracing::{debug, error, info, warn};

use crate::frame::{ErrorCode, Inbound, Outbound};
use crate::services::explain::FALLBACK_EXPLANATION;
use crate::services::session::Session;
use crate::state::AppState;

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_ws(socket, state))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState) {
    let mut session = match Session::open(state.llm.clone()).await {
        Ok(session) => session,
        Err(e) => {
            error!(error = %e, code = e.error_code(), "ws: liveness probe failed, closing");
            let _ = socket.send(Message::Close(None)).await;
            return;
        }
    };
    let session_id = session.id();
    info!(%session_id, "ws: client connected");

    while let Some(msg) = socket.recv().await {
        let Ok(msg) = msg else { break };
        match msg {
            Message::Text(text) => {
                let reply = process_inbound_text(&mut session, text.as_str()).await;
                if send_frame(&mut socket, &reply).await.is_err() {
                    break;
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    info!(%session_id, "ws: client disconnected");
}

// =============================================================================
// FRAME DISPATCH
// =============================================================================

/// Parse and process one inbound text frame and return the reply.
///
/// Kept apart from the socket so tests can drive a session directly.
async fn process_inbound_text(session: &mut Session, text: &str) -> Outbound {
    debug!(session_id = %session.id(), %text, "ws: raw inbound frame");
    let inbound = match Inbound::parse(text) {
        Ok(inbound) => inbound,
        Err(e) => {
            warn!(session_id = %session.id(), error = %e, code = e.error_code(), "ws: invalid inbound frame");
            return Outbound::invalid_format();
        }
    };
    info!(session_id = %session.id(), kind = inbound.kind(), "ws: recv frame");

    match inbound {
        Inbound::ExplainPlay(request) => {
            let session_id = session.id();
            let text = session.explain_play(&request).await.unwrap_or_else(|e| {
                warn!(%session_id, error = %e, code = e.error_code(), "ws: explanation failed, using fallback");
                FALLBACK_EXPLANATION.to_owned()
            });
            Outbound::Explanation(text)
        }
        Inbound::Chat(request) => match session.answer(request).await {
            Ok(text) => Outbound::Text(text),
            Err(e) => {
                warn!(session_id = %session.id(), error = %e, code = e.error_code(), retryable = e.retryable(), "ws: chat failed");
                Outbound::error_from(&e)
            }
        },
    }
}

async fn send_frame(socket: &mut WebSocket, frame: &Outbound) -> Result<(), ()> {
    let json = match serde_json::to_string(frame) {
        Ok(j) => j,
        Err(e) => {
            warn!(error = %e, "ws: failed to serialize frame");
            return Err(());
        }
    };
    info!(kind = frame.kind(), bytes = json.len(), "ws: send frame");
    socket.send(Message::Text(json.into())).await.map_err(|_| ())
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;
