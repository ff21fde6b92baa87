//! Rendering and saving generated blueprints.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

/// Serialize `doc` as pretty or compact JSON.
pub fn render(doc: &Value, compact: bool) -> Result<String> {
    let json = if compact {
        serde_json::to_string(doc)
    } else {
        serde_json::to_string_pretty(doc)
    };
    json.context("failed to serialize scenario")
}

/// Write `doc` to `path`, ready for import into Make.com.
pub fn write_to_file(doc: &Value, path: &Path, compact: bool) -> Result<()> {
    let mut json = render(doc, compact)?;
    json.push('\n');
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}
