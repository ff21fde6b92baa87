//! LLM integration layer.
//!
//! - [`types`] -- Request and reply types.
//! - [`client`] -- HTTP client for the Anthropic Messages API.

pub mod client;
pub mod types;

pub use client::{LlmClient, LlmClientConfig};
pub use types::{ChatRequest, ChatResponse, Usage};
