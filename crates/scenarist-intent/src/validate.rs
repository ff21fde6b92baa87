//! Structural checks on a scenario document.
//!
//! Locally assembled documents satisfy these by construction; the generator
//! applies them to documents written by the remote model before accepting
//! one.  The check reads only `flow[*].id`, `module`, `parameters` and
//! `mapper`; every other field may take any shape.

use std::collections::HashSet;

use serde_json::Value;

use crate::error::{IntentError, Result};
use crate::module::Reference;

/// Check the data-model invariants of the JSON document `doc`:
///
/// - `flow` is a non-empty array;
/// - ids are positive integers, strictly increasing in flow order;
/// - every module names its type;
/// - every `{{id.field}}` in a module's parameters or mapper names a module
///   that appears earlier in the flow.
pub fn validate_scenario(doc: &Value) -> Result<()> {
    let flow = doc
        .get("flow")
        .and_then(Value::as_array)
        .ok_or_else(|| invalid("flow is missing or not an array"))?;
    if flow.is_empty() {
        return Err(invalid("flow is empty"));
    }

    let mut seen: HashSet<u64> = HashSet::with_capacity(flow.len());
    let mut previous: u64 = 0;

    for module in flow {
        let name = module
            .get("module")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let id = module
            .get("id")
            .and_then(Value::as_u64)
            .ok_or_else(|| invalid(format!("module `{name}` has no integer id")))?;

        if id == 0 {
            return Err(invalid(format!("module `{name}` has id 0")));
        }
        if id <= previous {
            return Err(invalid(format!("module id {id} does not follow {previous}")));
        }
        if name.trim().is_empty() {
            return Err(invalid(format!("module {id} has no type")));
        }

        let mut refs = Vec::new();
        for key in ["parameters", "mapper"] {
            if let Some(value) = module.get(key) {
                collect_references(value, &mut refs);
            }
        }

        if let Some(bad) = refs
            .iter()
            .find(|r| !seen.contains(&u64::from(r.source.get())))
        {
            return Err(invalid(format!(
                "module {id} references {bad}, which is not an earlier module"
            )));
        }

        seen.insert(id);
        previous = id;
    }

    Ok(())
}

fn collect_references(value: &Value, out: &mut Vec<Reference>) {
    match value {
        Value::String(s) => out.extend(Reference::scan(s)),
        Value::Array(items) => items.iter().for_each(|v| collect_references(v, out)),
        Value::Object(map) => map.values().for_each(|v| collect_references(v, out)),
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

fn invalid(reason: impl Into<String>) -> IntentError {
    IntentError::InvalidScenario {
        reason: reason.into(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
