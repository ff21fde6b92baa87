//! CLI argument definitions for Scenarist.
//!
//! All `clap` structures live here so that `main.rs` stays focused on
//! dispatching subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Scenarist -- natural language to Make.com scenarios.
#[derive(Parser)]
#[command(
    name = "scenarist",
    version,
    about = "Scenarist -- natural language to Make.com scenarios",
    long_about = "Turns a short description of an automation into a Make.com scenario \
                  blueprint (trigger, AI step, action), using a hosted model when an \
                  Anthropic API key is configured and a keyword-based builder otherwise."
)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "config/default.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a scenario blueprint from a prompt.
    Generate {
        /// Description of the automation, in any language.
        prompt: String,

        /// Write the blueprint to this file instead of stdout
        /// (conventionally `scenario-make.json`).
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Emit compact JSON instead of pretty-printed JSON.
        #[arg(long)]
        compact: bool,
    },

    /// Start the HTTP API server.
    Serve {
        /// Address to bind the HTTP server to (overrides the config file).
        #[arg(long)]
        bind: Option<String>,

        /// Port to listen on (overrides the config file).
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Show the effective configuration.
    Status,
}
