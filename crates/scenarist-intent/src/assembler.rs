//! Document assembler — lowers a typed chain into the wire document.
//!
//! This is the only place references are rendered to `{{id.field}}`
//! strings.

use serde_json::Map;

use crate::module::ChainModule;
use crate::scenario::{
    DocumentMetadata, MODULE_VERSION, Module, ModuleMetadata, ScenarioDocument,
};

/// Name given to every locally assembled scenario.
pub const SCENARIO_NAME: &str = "AI Generated Scenario";

/// Maximum length of the description, in characters.
pub const DESCRIPTION_MAX_CHARS: usize = 200;

/// Wrap `flow` into a scenario document described by `prompt`.
pub fn assemble(flow: Vec<ChainModule>, prompt: &str) -> ScenarioDocument {
    assemble_with_limit(flow, prompt, DESCRIPTION_MAX_CHARS)
}

/// Like [`assemble`], truncating the description to `max_chars`.
pub fn assemble_with_limit(
    flow: Vec<ChainModule>,
    prompt: &str,
    max_chars: usize,
) -> ScenarioDocument {
    ScenarioDocument {
        name: SCENARIO_NAME.to_owned(),
        description: truncate_chars(prompt, max_chars),
        flow: flow.iter().map(lower).collect(),
        metadata: DocumentMetadata::default(),
    }
}

/// Convert one chain module to its serialized form.
pub fn lower(module: &ChainModule) -> Module {
    let (parameters_hints, expect_hints) = module.kind.ui_hints();

    Module {
        id: module.id.get(),
        module: module.kind.name().to_owned(),
        version: MODULE_VERSION,
        parameters: module.kind.parameters(),
        mapper: module.kind.mapper(module.input.as_ref()),
        metadata: ModuleMetadata {
            designer: module.layout,
            restore: Map::new(),
            parameters: parameters_hints,
            expect: expect_hints,
        },
    }
}

/// The first `max_chars` characters of `text`, never splitting a character.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_owned(),
        None => text.to_owned(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
