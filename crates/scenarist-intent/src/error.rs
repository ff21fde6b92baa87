//! Engine error types.
//!
//! Classification, building and assembly are total and never fail.  The
//! only error a caller of [`crate::ScenarioGenerator::generate`] can observe
//! is [`IntentError::EmptyPrompt`]; the remaining variants describe remote
//! failures that the generator absorbs before falling back.

/// Unified error type for the scenario engine.
#[derive(Debug, thiserror::Error)]
pub enum IntentError {
    // -- Input ---------------------------------------------------------------
    /// The prompt was empty or contained only whitespace.
    #[error("prompt is required")]
    EmptyPrompt,

    // -- Remote reply --------------------------------------------------------
    /// The model reply did not contain a usable JSON document.
    #[error("malformed model reply: {reason}")]
    MalformedReply { reason: String },

    /// The document breaks a data-model invariant.
    #[error("invalid scenario: {reason}")]
    InvalidScenario { reason: String },

    // -- Upstream crate errors -----------------------------------------------
    /// An error propagated from the remote model client.
    #[error("agent error: {0}")]
    Agent(#[from] scenarist_agent::AgentError),

    // -- Serialization -------------------------------------------------------
    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the engine crate.
pub type Result<T> = std::result::Result<T, IntentError>;
