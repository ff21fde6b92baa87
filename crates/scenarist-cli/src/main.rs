//! CLI entry point for Scenarist.
//!
//! This binary provides the `scenarist` command with subcommands for
//! generating a blueprint, serving the HTTP API, and checking configuration.

mod cli;
mod config;
mod output;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use scenarist_web::WebServer;

use crate::cli::{Cli, Commands};
use crate::config::{API_KEY_VAR, AppConfig};

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            prompt,
            output,
            compact,
        } => cmd_generate(&cli.config, &prompt, output.as_deref(), compact).await,
        Commands::Serve { bind, port } => cmd_serve(&cli.config, bind, port).await,
        Commands::Status => cmd_status(&cli.config),
    }
}

// ---------------------------------------------------------------------------
// Subcommand: generate
// ---------------------------------------------------------------------------

async fn cmd_generate(
    config_path: &Path,
    prompt: &str,
    output: Option<&Path>,
    compact: bool,
) -> Result<()> {
    init_tracing("warn");

    let config = AppConfig::load(config_path);
    let generator = config.build_generator()?;

    let generation = generator
        .generate_with_source(prompt)
        .await
        .context("scenario generation failed")?;

    match output {
        Some(path) => {
            output::write_to_file(&generation.scenario, path, compact)?;
            eprintln!(
                "  Wrote {} ({} modules, {} generation)",
                path.display(),
                generation.module_count(),
                generation.source
            );
        }
        None => println!("{}", output::render(&generation.scenario, compact)?),
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Subcommand: serve
// ---------------------------------------------------------------------------

async fn cmd_serve(config_path: &Path, bind: Option<String>, port: Option<u16>) -> Result<()> {
    init_tracing("info");

    let mut config = AppConfig::load(config_path);
    if let Some(bind) = bind {
        config.server.bind_addr = bind;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let generator = Arc::new(config.build_generator()?);
    let server = WebServer::new(config.server.clone(), generator);

    println!();
    println!("  Scenarist API: http://{}", server.addr());
    println!("  Press Ctrl+C to stop.");
    println!();

    server
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("web server error: {e}"))
}

// ---------------------------------------------------------------------------
// Subcommand: status
// ---------------------------------------------------------------------------

fn cmd_status(config_path: &Path) -> Result<()> {
    init_tracing("warn");

    let config = AppConfig::load(config_path);

    println!();
    println!("  Scenarist Status");
    println!("  ================");
    println!();

    if config_path.exists() {
        println!("  Config:           OK ({})", config_path.display());
    } else {
        println!("  Config:           MISSING (using defaults)");
    }

    if config.llm_client_config().is_some() {
        println!("  Anthropic API:    CONFIGURED (remote generation enabled)");
    } else {
        println!("  Anthropic API:    NOT SET (set {API_KEY_VAR} to enable remote generation)");
    }

    println!("  Model:            {}", config.llm.model);
    println!("  API base URL:     {}", config.llm.base_url);
    println!("  Max tokens:       {}", config.llm.max_tokens);
    println!("  Timeout:          {}s", config.llm.timeout_secs);
    println!(
        "  Validate remote:  {}",
        if config.generator.validate_remote { "yes" } else { "no" }
    );
    println!(
        "  Server:           {}:{}",
        config.server.bind_addr, config.server.port
    );
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Initialize the tracing subscriber with the given default log level.
///
/// Logs go to stderr so that `generate` can print the blueprint on stdout.
fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
