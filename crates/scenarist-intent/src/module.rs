//! Typed module model used by the chain builder.
//!
//! The builder never manipulates free-form JSON.  Each connector operation
//! the engine can emit is a [`ModuleKind`] variant that owns its qualified
//! name, its static parameters, its editor hints and the shape of its
//! mapper.  Links between modules are [`Reference`] values and become
//! `{{id.field}}` strings only when the assembler lowers the chain.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value, json};

use crate::scenario::{Layout, UiHint};

// ---------------------------------------------------------------------------
// Identifiers and references
// ---------------------------------------------------------------------------

/// 1-based module identifier, unique within a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModuleId(u32);

impl ModuleId {
    /// The id of the module at `index` (0-based) in append order.
    ///
    /// Saturates at `u32::MAX`.
    pub fn from_index(index: usize) -> Self {
        Self(u32::try_from(index).map_or(u32::MAX, |i| i.saturating_add(1)))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for ModuleId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

static REFERENCE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{(\d+)\.([^{}]+)\}\}").expect("reference pattern is a valid regex")
});

/// A pointer at one output field of an earlier module.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    pub source: ModuleId,
    pub field: String,
}

impl Reference {
    pub fn new(source: ModuleId, field: impl Into<String>) -> Self {
        Self {
            source,
            field: field.into(),
        }
    }

    /// The `{{id.field}}` template form understood by the platform.
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Every reference expression embedded in `text`, in order.
    ///
    /// Ids that do not fit a `u32` are skipped.
    pub fn scan(text: &str) -> Vec<Reference> {
        REFERENCE_PATTERN
            .captures_iter(text)
            .filter_map(|caps| {
                let id = caps[1].parse::<u32>().ok()?;
                Some(Reference::new(ModuleId(id), &caps[2]))
            })
            .collect()
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{{{}.{}}}}}", self.source, self.field)
    }
}

// ---------------------------------------------------------------------------
// Module kinds
// ---------------------------------------------------------------------------

/// Position of a module kind in the trigger → processing → action chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleRole {
    Trigger,
    Processing,
    Action,
}

/// Text-bearing output field of every trigger the engine emits.
const TRIGGER_TEXT_FIELD: &str = "text";

/// Response text of the chat completion module.
const CHAT_RESPONSE_FIELD: &str = "choices[0].message.content";

const AI_SYSTEM_PROMPT: &str =
    "You are an AI assistant that analyses data and extracts structured information.";

/// Connector operations the deterministic builder knows how to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleKind {
    GmailWatchEmails,
    TypeformWatchResponses,
    CustomWebhook,
    TwitterSearch,
    OpenAiChat,
    NotionCreatePage,
    SlackPostMessage,
    AirtableCreateRecord,
    GoogleSheetsAddRow,
    GmailSendEmail,
}

impl ModuleKind {
    /// Qualified `connector:operation` name.
    pub fn name(self) -> &'static str {
        match self {
            Self::GmailWatchEmails => "gmail:watchEmails",
            Self::TypeformWatchResponses => "typeform:watchResponses",
            Self::CustomWebhook => "webhook:customWebhook",
            Self::TwitterSearch => "twitter:search",
            Self::OpenAiChat => "openai:chat",
            Self::NotionCreatePage => "notion:createPage",
            Self::SlackPostMessage => "slack:postMessage",
            Self::AirtableCreateRecord => "airtable:createRecord",
            Self::GoogleSheetsAddRow => "google-sheets:addRow",
            Self::GmailSendEmail => "gmail:sendEmail",
        }
    }

    pub fn role(self) -> ModuleRole {
        match self {
            Self::GmailWatchEmails
            | Self::TypeformWatchResponses
            | Self::CustomWebhook
            | Self::TwitterSearch => ModuleRole::Trigger,
            Self::OpenAiChat => ModuleRole::Processing,
            Self::NotionCreatePage
            | Self::SlackPostMessage
            | Self::AirtableCreateRecord
            | Self::GoogleSheetsAddRow
            | Self::GmailSendEmail => ModuleRole::Action,
        }
    }

    /// The output field a downstream module should read, if any.
    pub fn output_field(self) -> Option<&'static str> {
        match self.role() {
            ModuleRole::Trigger => Some(TRIGGER_TEXT_FIELD),
            ModuleRole::Processing => Some(CHAT_RESPONSE_FIELD),
            ModuleRole::Action => None,
        }
    }

    /// Static connector configuration, placeholders included.
    pub fn parameters(self) -> Map<String, Value> {
        let v = match self {
            Self::GmailWatchEmails => json!({"filter": "is:unread", "maxResults": 10}),
            Self::TwitterSearch => json!({"query": "keyword to watch"}),
            Self::OpenAiChat => json!({"model": "gpt-4o", "temperature": 0.7, "max_tokens": 2000}),
            Self::NotionCreatePage => json!({"databaseId": "YOUR_DATABASE_ID"}),
            Self::SlackPostMessage => json!({"channel": "#general"}),
            Self::AirtableCreateRecord => {
                json!({"baseId": "YOUR_BASE_ID", "tableId": "YOUR_TABLE_ID"})
            }
            Self::GoogleSheetsAddRow => {
                json!({"spreadsheetId": "YOUR_SPREADSHEET_ID", "sheetId": "Sheet1"})
            }
            Self::TypeformWatchResponses | Self::CustomWebhook | Self::GmailSendEmail => json!({}),
        };
        into_object(v)
    }

    /// Mapper wiring `input` into this module's fields.
    ///
    /// Triggers have no input and always map nothing.
    pub fn mapper(self, input: Option<&Reference>) -> Map<String, Value> {
        let Some(input) = input.map(Reference::render) else {
            return Map::new();
        };

        let v = match self {
            Self::GmailWatchEmails
            | Self::TypeformWatchResponses
            | Self::CustomWebhook
            | Self::TwitterSearch => return Map::new(),
            Self::OpenAiChat => json!({
                "messages": [
                    {"role": "system", "content": AI_SYSTEM_PROMPT},
                    {
                        "role": "user",
                        "content": format!(
                            "Analyse this data and extract the important information:\n\n{input}"
                        ),
                    },
                ]
            }),
            Self::NotionCreatePage => json!({"title": input, "properties": {}}),
            Self::SlackPostMessage => json!({"text": input}),
            Self::AirtableCreateRecord => json!({"fields": {"Analysis": input}}),
            Self::GoogleSheetsAddRow => json!({"values": [input]}),
            Self::GmailSendEmail => json!({
                "to": "your-email@example.com",
                "subject": "AI Analysis",
                "text": input,
            }),
        };
        into_object(v)
    }

    /// Editor hints as `(parameters, expect)`.
    pub fn ui_hints(self) -> (Option<Vec<UiHint>>, Option<Vec<UiHint>>) {
        match self {
            Self::GmailWatchEmails => (
                Some(vec![UiHint::new("filter", "text", "Filter", false)]),
                None,
            ),
            Self::OpenAiChat => {
                let hints = vec![
                    UiHint::new("model", "select", "Model", true),
                    UiHint::new("messages", "array", "Messages", true),
                ];
                (Some(hints.clone()), Some(hints))
            }
            _ => (None, None),
        }
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn into_object(v: Value) -> Map<String, Value> {
    match v {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

// ---------------------------------------------------------------------------
// Chain module
// ---------------------------------------------------------------------------

/// One module as placed by the builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainModule {
    pub id: ModuleId,
    pub kind: ModuleKind,
    /// Output of the preceding module this one consumes.  `None` for the
    /// trigger.
    pub input: Option<Reference>,
    pub layout: Layout,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_renders_template() {
        let r = Reference::new(ModuleId::from(2), "choices[0].message.content");
        assert_eq!(r.render(), "{{2.choices[0].message.content}}");
    }

    #[test]
    fn scan_finds_every_reference() {
        let refs = Reference::scan("A {{1.text}} and {{12.body.subject}} but not {{x.y}} or {1.z}");
        assert_eq!(
            refs,
            vec![
                Reference::new(ModuleId::from(1), "text"),
                Reference::new(ModuleId::from(12), "body.subject"),
            ]
        );
    }

    #[test]
    fn scan_round_trips_render() {
        let r = Reference::new(ModuleId::from(7), "choices[0].message.content");
        assert_eq!(Reference::scan(&r.render()), vec![r]);
    }

    #[test]
    fn only_triggers_and_processing_expose_outputs() {
        assert_eq!(ModuleKind::TwitterSearch.output_field(), Some("text"));
        assert_eq!(
            ModuleKind::OpenAiChat.output_field(),
            Some("choices[0].message.content")
        );
        assert_eq!(ModuleKind::SlackPostMessage.output_field(), None);
    }

    #[test]
    fn trigger_mapper_is_empty_even_with_input() {
        let r = Reference::new(ModuleId::from(1), "text");
        assert!(ModuleKind::GmailWatchEmails.mapper(Some(&r)).is_empty());
    }

    #[test]
    fn action_mapper_embeds_reference() {
        let r = Reference::new(ModuleId::from(2), CHAT_RESPONSE_FIELD);
        let mapper = ModuleKind::AirtableCreateRecord.mapper(Some(&r));
        assert_eq!(mapper["fields"]["Analysis"], "{{2.choices[0].message.content}}");
    }

    #[test]
    fn module_id_from_index_is_one_based() {
        assert_eq!(ModuleId::from_index(0).get(), 1);
        assert_eq!(ModuleId::from_index(2).get(), 3);
    }

    #[test]
    fn module_id_from_huge_index_saturates() {
        assert_eq!(ModuleId::from_index(u32::MAX as usize).get(), u32::MAX);
        assert_eq!(ModuleId::from_index(usize::MAX).get(), u32::MAX);
    }
}
