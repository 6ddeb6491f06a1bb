//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Binds the fan WebSocket endpoint at `/` and a plain liveness check at
//! `/healthz` under a single Axum router with request tracing.

pub mod ws;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(ws::handle_ws))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
