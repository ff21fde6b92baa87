//! Web interface for Scenarist.
//!
//! This crate exposes the scenario generator over HTTP:
//!
//! - `POST /api/generate` turns a prompt into a scenario document.
//! - `GET /api/status` reports the server version and whether remote
//!   generation is enabled.

pub mod api;
pub mod server;
pub mod state;

pub use server::WebServer;
pub use state::AppState;

/// Web server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebConfig {
    /// The address to bind the HTTP server to.
    pub bind_addr: String,
    /// The port to listen on.
    pub port: u16,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".into(),
            port: 3000,
        }
    }
}
