//! Agent error types.
//!
//! Every failure of the remote round trip surfaces as an [`AgentError`].
//! Callers in the generator treat all of them as "remote unavailable".

/// Unified error type for the remote model client.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    // -- Configuration -------------------------------------------------------
    /// The API key is missing or empty.
    #[error("missing api key for provider: {provider}")]
    MissingApiKey { provider: String },

    // -- Transport -----------------------------------------------------------
    /// The HTTP request failed or the provider answered with a non-success
    /// status.
    #[error("llm request failed: {reason}")]
    LlmRequestFailed { reason: String },

    /// The request did not complete within the configured timeout.
    #[error("llm request timed out after {secs}s")]
    Timeout { secs: u64 },

    // -- Reply ---------------------------------------------------------------
    /// The provider reply did not have the expected shape.
    #[error("llm response parse error: {reason}")]
    LlmParseFailed { reason: String },
}

/// Convenience alias used throughout the agent crate.
pub type Result<T> = std::result::Result<T, AgentError>;

impl From<reqwest::Error> for AgentError {
    fn from(err: reqwest::Error) -> Self {
        Self::LlmRequestFailed {
            reason: err.to_string(),
        }
    }
}
