//! Module chain builder — trigger, AI processing step, action.
//!
//! Selection is first-match-wins over a fixed priority order, not a score.
//! The order is part of the output contract: the same flags must always
//! produce the same chain.

use tracing::debug;

use crate::classifier::{Service, ServiceFlags};
use crate::module::{ChainModule, ModuleId, ModuleKind, ModuleRole, Reference};
use crate::scenario::Layout;

/// Horizontal distance between consecutive modules in the editor.
pub const LAYOUT_STEP: i64 = 300;

/// Trigger candidates, highest priority first.
const TRIGGER_PRIORITY: [(Service, ModuleKind); 4] = [
    (Service::Mail, ModuleKind::GmailWatchEmails),
    (Service::FormIntake, ModuleKind::TypeformWatchResponses),
    (Service::GenericWebhook, ModuleKind::CustomWebhook),
    (Service::SocialSearch, ModuleKind::TwitterSearch),
];

/// Action candidates, highest priority first.
const ACTION_PRIORITY: [(Service, ModuleKind); 4] = [
    (Service::WorkspaceNotes, ModuleKind::NotionCreatePage),
    (Service::TeamChat, ModuleKind::SlackPostMessage),
    (Service::SpreadsheetDatabase, ModuleKind::AirtableCreateRecord),
    (Service::Spreadsheet, ModuleKind::GoogleSheetsAddRow),
];

const DEFAULT_TRIGGER: ModuleKind = ModuleKind::CustomWebhook;
const DEFAULT_ACTION: ModuleKind = ModuleKind::GmailSendEmail;

/// The trigger for `flags`; a custom webhook when nothing matches.
pub fn select_trigger(flags: &ServiceFlags) -> ModuleKind {
    first_match(flags, &TRIGGER_PRIORITY).unwrap_or(DEFAULT_TRIGGER)
}

/// The terminal action for `flags`; a Gmail send when nothing matches.
pub fn select_action(flags: &ServiceFlags) -> ModuleKind {
    first_match(flags, &ACTION_PRIORITY).unwrap_or(DEFAULT_ACTION)
}

fn first_match(flags: &ServiceFlags, table: &[(Service, ModuleKind)]) -> Option<ModuleKind> {
    table
        .iter()
        .find(|(service, _)| flags.contains(*service))
        .map(|(_, kind)| *kind)
}

/// Build the three-module chain for a classified prompt.
///
/// Total: every flag combination yields exactly trigger, `openai:chat`,
/// action, with ids `1, 2, 3`.
pub fn build(flags: &ServiceFlags, prompt: &str) -> Vec<ChainModule> {
    let trigger = select_trigger(flags);
    let action = select_action(flags);

    debug!(
        prompt_chars = prompt.chars().count(),
        trigger = %trigger,
        action = %action,
        "building module chain"
    );

    let mut chain = ChainBuilder::new();
    chain.append(trigger);
    chain.append(ModuleKind::OpenAiChat);
    chain.append(action);
    chain.finish()
}

// ---------------------------------------------------------------------------
// Chain builder
// ---------------------------------------------------------------------------

/// Appends modules while keeping ids, layout and references consistent.
///
/// Ids are assigned in append order starting at 1.  Every non-trigger
/// module is wired to the output field of the module appended just before
/// it, so a reference can never point forward or at itself.
#[derive(Debug, Default)]
pub struct ChainBuilder {
    modules: Vec<ChainModule>,
}

impl ChainBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a module and return its id.
    pub fn append(&mut self, kind: ModuleKind) -> ModuleId {
        let index = self.modules.len();
        let id = ModuleId::from_index(index);

        let input = match kind.role() {
            ModuleRole::Trigger => None,
            ModuleRole::Processing | ModuleRole::Action => self.modules.last().and_then(|prev| {
                prev.kind
                    .output_field()
                    .map(|field| Reference::new(prev.id, field))
            }),
        };

        self.modules.push(ChainModule {
            id,
            kind,
            input,
            layout: Layout {
                x: index as i64 * LAYOUT_STEP,
                y: 0,
            },
        });

        id
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn finish(self) -> Vec<ChainModule> {
        self.modules
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
