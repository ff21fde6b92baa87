//! Core types for LLM interaction.
//!
//! These types model the data flowing between the generator and the model
//! provider.  The [`super::client`] module translates them into the
//! provider wire format.

// ---------------------------------------------------------------------------
// Chat request
// ---------------------------------------------------------------------------

/// A single-turn request: one user message, answered once.
///
/// Model and reply-length bound come from the client configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    /// Content of the user message.
    pub prompt: String,

    /// Sampling temperature; `None` leaves the provider default.
    pub temperature: Option<f32>,
}

impl ChatRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            temperature: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Chat response
// ---------------------------------------------------------------------------

/// The text reply of the model for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatResponse {
    /// Concatenation of every text block in the reply.
    pub text: String,
    /// Why generation stopped (`"end_turn"`, `"max_tokens"`, ...).
    pub stop_reason: Option<String>,
    /// Token accounting reported by the provider.
    pub usage: Usage,
}

/// Token usage information returned by the LLM.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    /// Number of tokens in the input (prompt).
    pub input_tokens: u32,
    /// Number of tokens generated by the model.
    pub output_tokens: u32,
}
