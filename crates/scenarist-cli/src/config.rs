//! Runtime configuration.
//!
//! Reads `config/default.toml` (sections `[llm]`, `[generator]`, `[server]`)
//! and applies environment overrides.  Every missing file, section or key
//! falls back to a default; everything is resolved here and injected into
//! the generator and the web server.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use scenarist_agent::llm::client::{
    ANTHROPIC_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TIMEOUT,
};
use scenarist_agent::{LlmClient, LlmClientConfig};
use scenarist_intent::{DESCRIPTION_MAX_CHARS, GeneratorConfig, ScenarioGenerator};
use scenarist_web::WebConfig;

/// Credential for the remote model.
pub const API_KEY_VAR: &str = "ANTHROPIC_API_KEY";
/// Overrides `[llm] model`.
pub const MODEL_VAR: &str = "SCENARIST_MODEL";
/// Overrides `[llm] base_url`.
pub const BASE_URL_VAR: &str = "SCENARIST_API_BASE_URL";

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Settings of the `[llm]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmSettings {
    pub model: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    pub base_url: String,
    /// Sampling temperature; `None` leaves it to the provider.
    pub temperature: Option<f32>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_owned(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            base_url: ANTHROPIC_BASE_URL.to_owned(),
            temperature: None,
        }
    }
}

/// Settings of the `[generator]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorSettings {
    pub description_max_chars: usize,
    pub validate_remote: bool,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            description_max_chars: DESCRIPTION_MAX_CHARS,
            validate_remote: true,
        }
    }
}

/// Fully resolved configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppConfig {
    pub llm: LlmSettings,
    pub generator: GeneratorSettings,
    pub server: WebConfig,
    /// The remote-model credential; `None` disables remote generation.
    pub api_key: Option<String>,
}

impl AppConfig {
    /// Load `path` and apply the process environment.
    pub fn load(path: &Path) -> Self {
        Self::from_file(path).with_env(env_non_empty)
    }

    /// Load `path` alone.  A missing or unparsable file yields the defaults.
    pub fn from_file(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => {
                tracing::debug!(path = %path.display(), "config file not found, using defaults");
                return Self::default();
            }
        };

        match content.parse::<toml::Table>() {
            Ok(table) => Self::from_table(&table),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "invalid config file, using defaults");
                Self::default()
            }
        }
    }

    /// Read the known sections of `table`.
    pub fn from_table(table: &toml::Table) -> Self {
        let defaults = Self::default();
        let empty = toml::Table::new();

        let section = |name: &str| match table.get(name) {
            Some(toml::Value::Table(t)) => t,
            _ => &empty,
        };
        let llm = section("llm");
        let generator = section("generator");
        let server = section("server");

        Self {
            llm: LlmSettings {
                model: string_key(llm, "model").unwrap_or(defaults.llm.model),
                max_tokens: llm
                    .get("max_tokens")
                    .and_then(|v| v.as_integer())
                    .map(|v| v.clamp(1, i64::from(u32::MAX)) as u32)
                    .unwrap_or(defaults.llm.max_tokens),
                timeout_secs: llm
                    .get("timeout_secs")
                    .and_then(|v| v.as_integer())
                    .map(|v| v.max(1) as u64)
                    .unwrap_or(defaults.llm.timeout_secs),
                base_url: string_key(llm, "base_url").unwrap_or(defaults.llm.base_url),
                temperature: match llm.get("temperature") {
                    Some(toml::Value::Float(f)) => Some(*f as f32),
                    Some(toml::Value::Integer(i)) => Some(*i as f32),
                    _ => defaults.llm.temperature,
                }
                .filter(|t| t.is_finite() && *t >= 0.0),
            },
            generator: GeneratorSettings {
                description_max_chars: generator
                    .get("description_max_chars")
                    .and_then(|v| v.as_integer())
                    .map(|v| v.max(0) as usize)
                    .unwrap_or(defaults.generator.description_max_chars),
                validate_remote: generator
                    .get("validate_remote")
                    .and_then(|v| v.as_bool())
                    .unwrap_or(defaults.generator.validate_remote),
            },
            server: WebConfig {
                bind_addr: string_key(server, "bind").unwrap_or(defaults.server.bind_addr),
                port: server
                    .get("port")
                    .and_then(|v| v.as_integer())
                    .and_then(|v| u16::try_from(v).ok())
                    .unwrap_or(defaults.server.port),
            },
            api_key: None,
        }
    }

    /// Apply environment overrides read through `lookup`.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        self.api_key = lookup(API_KEY_VAR);
        if let Some(model) = lookup(MODEL_VAR) {
            self.llm.model = model;
        }
        if let Some(url) = lookup(BASE_URL_VAR) {
            self.llm.base_url = url;
        }
        self
    }

    /// Client settings, or `None` when no credential is configured.
    pub fn llm_client_config(&self) -> Option<LlmClientConfig> {
        let key = self.api_key.as_deref().filter(|k| !k.trim().is_empty())?;
        Some(
            LlmClientConfig::anthropic(key, &self.llm.model)
                .with_base_url(&self.llm.base_url)
                .with_max_tokens(self.llm.max_tokens)
                .with_timeout(Duration::from_secs(self.llm.timeout_secs)),
        )
    }

    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            description_max_chars: self.generator.description_max_chars,
            validate_remote: self.generator.validate_remote,
            temperature: self.llm.temperature,
        }
    }

    /// Build the generator, with a remote client when a credential is set.
    pub fn build_generator(&self) -> Result<ScenarioGenerator> {
        let config = self.generator_config();
        match self.llm_client_config() {
            Some(llm_config) => {
                let llm = LlmClient::new(llm_config).context("failed to create LLM client")?;
                tracing::info!(model = %self.llm.model, "remote generation enabled");
                Ok(ScenarioGenerator::with_llm(config, Arc::new(llm)))
            }
            None => {
                tracing::info!("{API_KEY_VAR} not set, using the keyword-based builder only");
                Ok(ScenarioGenerator::new(config))
            }
        }
    }
}

fn string_key(table: &toml::Table, key: &str) -> Option<String> {
    table
        .get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// Read an environment variable, treating an empty value as unset.
pub fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
