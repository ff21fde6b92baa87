//! Remote model client for Scenarist.
//!
//! The scenario generator optionally asks a hosted large-language model to
//! write the scenario document directly.  This crate owns that conversation:
//! request shaping, authentication headers, the bounded HTTP round trip and
//! the extraction of the reply text.
//!
//! ## Modules
//!
//! - [`llm`] -- LLM client and wire types.
//! - [`error`] -- Agent error types.

pub mod error;
pub mod llm;

// Re-export the most commonly used types at the crate root.
pub use error::{AgentError, Result};
pub use llm::{ChatRequest, ChatResponse, LlmClient, LlmClientConfig, Usage};
