//! Scenario document — the serialized blueprint handed to Make.com.
//!
//! These structs mirror the blueprint import format field for field and
//! describe documents assembled locally.  Documents written by the remote
//! model are kept as raw JSON and never pass through these types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Integration-schema version stamped on every module.
pub const MODULE_VERSION: u32 = 3;

/// Blueprint format version stamped on every document.
pub const BLUEPRINT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Module
// ---------------------------------------------------------------------------

/// Position of a module in the platform's visual editor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    pub x: i64,
    pub y: i64,
}

/// Editor hint describing one user-editable parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiHint {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub label: String,
    pub required: bool,
}

impl UiHint {
    pub fn new(name: &str, kind: &str, label: &str, required: bool) -> Self {
        Self {
            name: name.to_owned(),
            kind: kind.to_owned(),
            label: label.to_owned(),
            required,
        }
    }
}

/// Presentation metadata attached to a module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleMetadata {
    /// Layout position.
    pub designer: Layout,

    /// Editor restore state; always empty when built locally.
    pub restore: Map<String, Value>,

    /// Editable parameters shown in the module form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<UiHint>>,

    /// Expected mapped inputs shown in the module form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expect: Option<Vec<UiHint>>,
}

/// One node of the scenario flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    /// 1-based position in the chain; referenced by `{{id.field}}`.
    pub id: u32,

    /// Qualified connector operation, e.g. `gmail:watchEmails`.
    pub module: String,

    pub version: u32,

    /// Static connector configuration.
    pub parameters: Map<String, Value>,

    /// Inputs mapped from earlier modules' outputs.
    pub mapper: Map<String, Value>,

    pub metadata: ModuleMetadata,
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// Scenario-level execution settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionPolicy {
    pub roundtrips: u32,
    pub max_errors: u32,
    pub auto_commit: bool,
    pub sequential: bool,
    pub confidential: bool,
    pub dataloss: bool,
    pub dlq: bool,
}

impl Default for ExecutionPolicy {
    fn default() -> Self {
        Self {
            roundtrips: 1,
            max_errors: 3,
            auto_commit: true,
            sequential: false,
            confidential: false,
            dataloss: false,
            dlq: false,
        }
    }
}

/// Scenario-level editor state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DesignerMetadata {
    pub orphans: Vec<Value>,
}

/// Document-level metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub version: u32,
    pub scenario: ExecutionPolicy,
    pub designer: DesignerMetadata,
}

impl Default for DocumentMetadata {
    /// Fixed execution policy and an empty orphan list.
    fn default() -> Self {
        Self {
            version: BLUEPRINT_VERSION,
            scenario: ExecutionPolicy::default(),
            designer: DesignerMetadata::default(),
        }
    }
}

/// The root scenario document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioDocument {
    pub name: String,
    pub description: String,

    /// Modules in connection order.
    pub flow: Vec<Module>,

    pub metadata: DocumentMetadata,
}

impl ScenarioDocument {
    /// Look a module up by id.
    pub fn module(&self, id: u32) -> Option<&Module> {
        self.flow.iter().find(|m| m.id == id)
    }

    /// Pretty-printed JSON, the form offered for copy and download.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
