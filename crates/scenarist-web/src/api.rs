//! REST API route handlers.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use scenarist_intent::IntentError;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET /api/status
// ---------------------------------------------------------------------------

/// Response payload for the `/api/status` endpoint.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub remote_enabled: bool,
}

/// Return basic server status.
pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        remote_enabled: state.generator.remote_enabled(),
    })
}

// ---------------------------------------------------------------------------
// POST /api/generate
// ---------------------------------------------------------------------------

/// Request body for the generate endpoint.
#[derive(Debug, Deserialize)]
pub struct GenerateBody {
    /// The automation request.  A missing field is treated as empty.
    #[serde(default)]
    pub prompt: Option<String>,
}

/// Generate a scenario document for the prompt in the request body.
///
/// Responds `200 {"scenario", "source"}`, or `400 {"error"}` when the prompt
/// is missing or blank.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Json(body): Json<GenerateBody>,
) -> (StatusCode, Json<Value>) {
    let prompt = body.prompt.unwrap_or_default();

    match state.generator.generate_with_source(&prompt).await {
        Ok(generation) => (
            StatusCode::OK,
            Json(json!({
                "scenario": generation.scenario,
                "source": generation.source,
            })),
        ),
        Err(e @ IntentError::EmptyPrompt) => {
            tracing::debug!("rejected generate request without prompt");
            (StatusCode::BAD_REQUEST, Json(json!({"error": e.to_string()})))
        }
        Err(e) => {
            tracing::error!(error = %e, "scenario generation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": e.to_string()})),
            )
        }
    }
}
