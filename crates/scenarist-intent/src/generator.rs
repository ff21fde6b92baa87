//! Generation coordinator — remote model first, deterministic fallback.
//!
//! Per request the generator runs at most two states:
//!
//! 1. **Remote attempt** (only when a client was injected): one request to
//!    the model carrying the blueprint instructions and the user prompt.
//!    The reply is unwrapped from an optional code fence, parsed as JSON
//!    and, unless disabled, validated.  The document is kept as written.
//! 2. **Fallback**: classify → build → assemble.  No I/O, cannot fail.
//!
//! Remote failures of any kind are logged and absorbed.  The only error a
//! caller can see is [`IntentError::EmptyPrompt`].

use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use scenarist_agent::{ChatRequest, LlmClient};

use crate::assembler::{DESCRIPTION_MAX_CHARS, assemble_with_limit};
use crate::builder::build;
use crate::classifier::classify;
use crate::error::{IntentError, Result};
use crate::scenario::ScenarioDocument;
use crate::validate::validate_scenario;

// ---------------------------------------------------------------------------
// Instructions sent to the remote model
// ---------------------------------------------------------------------------

const BLUEPRINT_INSTRUCTIONS: &str = r#"You are a Make.com automation expert. You write detailed Make.com scenarios in the JSON blueprint format so they can be imported directly into Make.com.

Structure of a Make.com scenario:
- flow: array of connected modules
- name: scenario name
- description: scenario description

Each module must have:
- id: unique identifier (number)
- module: module name (e.g. "gmail:watchEmails", "openai:chat", "notion:createPage", "http:makeRequest")
- version: version number (usually 3)
- parameters: module-specific parameters
- mapper: data mapped from other modules, using {{moduleId.field}} references to earlier modules only
- metadata: UI position and configuration

Common AI modules:
1. "openai:chat" - OpenAI GPT agent for analysis, extraction, classification
2. "anthropic:claude" - Claude agent for advanced text processing
3. "google:gemini" - Google Gemini agent
4. "http:makeRequest" - API calls to any AI service

Popular modules:
- gmail:watchEmails, gmail:sendEmail
- notion:createPage, notion:updatePage
- airtable:createRecord, airtable:getRecords
- slack:postMessage
- googleSheets:addRow
- typeform:watchResponses
- twitter:search
- webhook:customWebhook

IMPORTANT: produce valid JSON that follows exactly this format and includes at least one AI module to process or analyse the data.

Basic structure example:
{
  "name": "My Scenario",
  "flow": [
    {
      "id": 1,
      "module": "gmail:watchEmails",
      "version": 3,
      "parameters": {
        "filter": "is:unread"
      },
      "mapper": {},
      "metadata": {
        "designer": {
          "x": 0,
          "y": 0
        }
      }
    },
    {
      "id": 2,
      "module": "openai:chat",
      "version": 3,
      "parameters": {
        "model": "gpt-4",
        "messages": [
          {
            "role": "user",
            "content": "Analyse this email and extract the key information: {{1.content}}"
          }
        ]
      },
      "mapper": {},
      "metadata": {
        "designer": {
          "x": 300,
          "y": 0
        }
      }
    }
  ],
  "metadata": {
    "version": 1
  }
}

Now write a complete, working scenario based on the user's request."#;

/// The single user message sent to the model for `prompt`.
pub fn remote_message(prompt: &str) -> String {
    format!(
        "{BLUEPRINT_INSTRUCTIONS}\n\nUser request: {prompt}\n\n\
         Reply ONLY with the JSON of the Make.com scenario, with no text before or after."
    )
}

static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```(?:json)?\s*([\s\S]*?)```").expect("fence pattern is a valid regex")
});

/// The JSON body of a model reply.
///
/// The content of the first fenced block when there is one, the whole
/// trimmed reply otherwise.
pub fn extract_json_body(reply: &str) -> &str {
    let trimmed = reply.trim();
    FENCED_BLOCK
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .map_or(trimmed, |m| m.as_str().trim())
}

// ---------------------------------------------------------------------------
// Configuration and results
// ---------------------------------------------------------------------------

/// Generator settings, resolved by the caller and injected at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    /// Description length for fallback documents, in characters.
    pub description_max_chars: usize,
    /// Reject remote documents that break the data-model invariants.
    pub validate_remote: bool,
    /// Sampling temperature for the remote request; `None` leaves it to the
    /// provider.
    pub temperature: Option<f32>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            description_max_chars: DESCRIPTION_MAX_CHARS,
            validate_remote: true,
            temperature: None,
        }
    }
}

/// Which path produced a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationSource {
    Remote,
    Fallback,
}

impl fmt::Display for GenerationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote => write!(f, "remote"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

/// A generated document together with its provenance.
///
/// A remote document is the model's JSON exactly as written; a fallback
/// document is the serialized [`ScenarioDocument`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Generation {
    pub scenario: Value,
    pub source: GenerationSource,
}

impl Generation {
    /// Number of entries in the document's `flow`.
    pub fn module_count(&self) -> usize {
        self.scenario["flow"].as_array().map_or(0, Vec::len)
    }
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// Turns prompts into scenario documents.
///
/// Without a client only the deterministic path runs.  The generator holds
/// no per-request state and can be shared behind an `Arc`.
pub struct ScenarioGenerator {
    config: GeneratorConfig,
    llm: Option<Arc<LlmClient>>,
}

impl ScenarioGenerator {
    /// A generator that always uses the deterministic path.
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config, llm: None }
    }

    /// A generator that tries the remote model first.
    pub fn with_llm(config: GeneratorConfig, llm: Arc<LlmClient>) -> Self {
        Self {
            config,
            llm: Some(llm),
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Whether a remote attempt will be made.
    pub fn remote_enabled(&self) -> bool {
        self.llm.is_some()
    }

    /// Generate a scenario for `prompt`.
    pub async fn generate(&self, prompt: &str) -> Result<Value> {
        self.generate_with_source(prompt)
            .await
            .map(|generation| generation.scenario)
    }

    /// Generate a scenario for `prompt`, reporting which path produced it.
    pub async fn generate_with_source(&self, prompt: &str) -> Result<Generation> {
        if prompt.trim().is_empty() {
            return Err(IntentError::EmptyPrompt);
        }

        let request_id = Uuid::now_v7();
        debug!(request_id = %request_id, prompt_chars = prompt.chars().count(), "generating scenario");

        if let Some(llm) = &self.llm {
            match self.remote_attempt(llm, prompt).await {
                Ok(scenario) => {
                    let generation = Generation {
                        scenario,
                        source: GenerationSource::Remote,
                    };
                    info!(
                        request_id = %request_id,
                        modules = generation.module_count(),
                        source = %generation.source,
                        "scenario generated"
                    );
                    return Ok(generation);
                }
                Err(e) => {
                    warn!(request_id = %request_id, error = %e, "remote generation failed, using fallback");
                }
            }
        }

        let generation = Generation {
            scenario: serde_json::to_value(self.generate_fallback(prompt))?,
            source: GenerationSource::Fallback,
        };
        info!(
            request_id = %request_id,
            modules = generation.module_count(),
            source = %generation.source,
            "scenario generated"
        );
        Ok(generation)
    }

    /// The deterministic path: classify, build, assemble.
    pub fn generate_fallback(&self, prompt: &str) -> ScenarioDocument {
        let flags = classify(prompt);
        let flow = build(&flags, prompt);
        assemble_with_limit(flow, prompt, self.config.description_max_chars)
    }

    /// One request to the model and the parsing of its reply.
    async fn remote_attempt(&self, llm: &LlmClient, prompt: &str) -> Result<Value> {
        let mut request = ChatRequest::new(remote_message(prompt));
        request.temperature = self.config.temperature;

        let response = llm.chat(&request).await?;
        debug!(
            output_tokens = response.usage.output_tokens,
            stop_reason = ?response.stop_reason,
            "model replied"
        );

        self.parse_reply(&response.text)
    }

    /// Parse (and optionally validate) the text of a model reply.
    ///
    /// The document is returned as the model wrote it: no field is added,
    /// dropped or reordered.
    pub fn parse_reply(&self, reply: &str) -> Result<Value> {
        let body = extract_json_body(reply);
        if body.is_empty() {
            return Err(IntentError::MalformedReply {
                reason: "reply is empty".into(),
            });
        }

        let scenario: Value =
            serde_json::from_str(body).map_err(|e| IntentError::MalformedReply {
                reason: format!("reply is not JSON: {e}"),
            })?;
        if !scenario.is_object() {
            return Err(IntentError::MalformedReply {
                reason: "reply is not a JSON object".into(),
            });
        }

        if self.config.validate_remote {
            validate_scenario(&scenario)?;
        }

        Ok(scenario)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
