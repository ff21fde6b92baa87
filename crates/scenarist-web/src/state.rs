//! Shared application state for the web server.
//!
//! [`AppState`] is wrapped in an `Arc` and shared across all request
//! handlers.  The generator holds no per-request state, so no locking is
//! needed.

use std::sync::Arc;

use scenarist_intent::ScenarioGenerator;

use crate::WebConfig;

/// Shared state accessible from every Axum handler.
#[derive(Clone)]
pub struct AppState {
    /// The scenario generator used for every request.
    pub generator: Arc<ScenarioGenerator>,

    /// Web server configuration.
    pub config: WebConfig,
}
