//! Intent classifier — detects which external services a prompt mentions.
//!
//! Detection is plain substring matching over the lower-cased prompt.  All
//! service keywords are compiled into a single [`aho_corasick`] automaton
//! and every overlapping match sets the flag of the service that owns the
//! keyword.  Flags are independent: a prompt may mention several services,
//! and it is the builder's priority order that picks one of them.

use std::sync::LazyLock;

use aho_corasick::AhoCorasick;
use serde::Serialize;
use tracing::debug;

// ---------------------------------------------------------------------------
// Services
// ---------------------------------------------------------------------------

/// An external service the classifier recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Service {
    /// Gmail (watch or send mail).
    Mail,
    /// Notion.
    WorkspaceNotes,
    /// Slack.
    TeamChat,
    /// Airtable.
    SpreadsheetDatabase,
    /// Google Sheets.
    Spreadsheet,
    /// Typeform.
    FormIntake,
    /// Twitter search.
    SocialSearch,
    /// A custom inbound webhook.
    GenericWebhook,
}

impl Service {
    /// Every recognized service.
    pub const ALL: [Service; 8] = [
        Service::Mail,
        Service::WorkspaceNotes,
        Service::TeamChat,
        Service::SpreadsheetDatabase,
        Service::Spreadsheet,
        Service::FormIntake,
        Service::SocialSearch,
        Service::GenericWebhook,
    ];

    /// Lower-case literals whose presence in a prompt signals this service.
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Service::Mail => &["email", "gmail"],
            Service::WorkspaceNotes => &["notion"],
            Service::TeamChat => &["slack"],
            Service::SpreadsheetDatabase => &["airtable"],
            Service::Spreadsheet => &["sheets", "google sheets"],
            Service::FormIntake => &["typeform"],
            Service::SocialSearch => &["twitter"],
            Service::GenericWebhook => &["webhook", "formulaire"],
        }
    }
}

// ---------------------------------------------------------------------------
// Flags
// ---------------------------------------------------------------------------

/// One boolean per recognized service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ServiceFlags {
    pub mail: bool,
    pub workspace_notes: bool,
    pub team_chat: bool,
    pub spreadsheet_database: bool,
    pub spreadsheet: bool,
    pub form_intake: bool,
    pub social_search: bool,
    pub generic_webhook: bool,
}

impl ServiceFlags {
    /// Whether the flag for `service` is set.
    pub fn contains(&self, service: Service) -> bool {
        match service {
            Service::Mail => self.mail,
            Service::WorkspaceNotes => self.workspace_notes,
            Service::TeamChat => self.team_chat,
            Service::SpreadsheetDatabase => self.spreadsheet_database,
            Service::Spreadsheet => self.spreadsheet,
            Service::FormIntake => self.form_intake,
            Service::SocialSearch => self.social_search,
            Service::GenericWebhook => self.generic_webhook,
        }
    }

    /// Set the flag for `service`.
    pub fn insert(&mut self, service: Service) {
        let flag = match service {
            Service::Mail => &mut self.mail,
            Service::WorkspaceNotes => &mut self.workspace_notes,
            Service::TeamChat => &mut self.team_chat,
            Service::SpreadsheetDatabase => &mut self.spreadsheet_database,
            Service::Spreadsheet => &mut self.spreadsheet,
            Service::FormIntake => &mut self.form_intake,
            Service::SocialSearch => &mut self.social_search,
            Service::GenericWebhook => &mut self.generic_webhook,
        };
        *flag = true;
    }

    /// Build a flag set from a list of services.
    pub fn from_services(services: impl IntoIterator<Item = Service>) -> Self {
        let mut flags = Self::default();
        for service in services {
            flags.insert(service);
        }
        flags
    }

    /// The services whose flag is set, in [`Service::ALL`] order.
    pub fn services(&self) -> Vec<Service> {
        Service::ALL
            .into_iter()
            .filter(|s| self.contains(*s))
            .collect()
    }

    /// Whether no flag is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

/// Keyword classifier backed by one Aho-Corasick automaton.
///
/// Built once per process; see [`classify`].
pub struct IntentClassifier {
    /// `(keyword, owning service)`, in automaton pattern order.
    keywords: Vec<(&'static str, Service)>,
    automaton: Option<AhoCorasick>,
}

impl IntentClassifier {
    /// Compile the automaton over every service keyword.
    pub fn new() -> Self {
        let keywords: Vec<(&'static str, Service)> = Service::ALL
            .into_iter()
            .flat_map(|s| s.keywords().iter().map(move |k| (*k, s)))
            .collect();

        let automaton = match AhoCorasick::new(keywords.iter().map(|(k, _)| *k)) {
            Ok(ac) => Some(ac),
            Err(e) => {
                tracing::error!(error = %e, "failed to build keyword automaton, using linear scan");
                None
            }
        };

        Self {
            keywords,
            automaton,
        }
    }

    /// Map prompt text to service flags.
    pub fn classify(&self, prompt: &str) -> ServiceFlags {
        let lowered = prompt.to_lowercase();
        let mut flags = ServiceFlags::default();

        match &self.automaton {
            Some(ac) => {
                // Overlapping iteration so "google sheets" also reports "sheets".
                for mat in ac.find_overlapping_iter(&lowered) {
                    flags.insert(self.keywords[mat.pattern().as_usize()].1);
                }
            }
            None => {
                for (keyword, service) in &self.keywords {
                    if lowered.contains(keyword) {
                        flags.insert(*service);
                    }
                }
            }
        }

        debug!(services = ?flags.services(), "prompt classified");
        flags
    }
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

static CLASSIFIER: LazyLock<IntentClassifier> = LazyLock::new(IntentClassifier::new);

/// Classify a prompt with the process-wide classifier.
///
/// Total: any input, including the empty string, yields a flag set.
pub fn classify(prompt: &str) -> ServiceFlags {
    CLASSIFIER.classify(prompt)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_prompt_sets_no_flags() {
        assert!(classify("").is_empty());
    }

    #[test]
    fn unknown_services_set_no_flags() {
        assert!(classify("every morning, summarise the weather forecast").is_empty());
    }

    #[test]
    fn matching_is_case_insensitive() {
        let flags = classify("Watch my GMAIL and post to SLACK");
        assert!(flags.mail);
        assert!(flags.team_chat);
        assert_eq!(flags.services(), vec![Service::Mail, Service::TeamChat]);
    }

    #[test]
    fn substring_inside_a_word_matches() {
        // "emails" contains "email".
        assert!(classify("surveille mes emails").mail);
    }

    #[test]
    fn flags_are_not_exclusive() {
        let flags = classify("typeform answers to airtable, notify via email and twitter");
        assert!(flags.form_intake);
        assert!(flags.spreadsheet_database);
        assert!(flags.mail);
        assert!(flags.social_search);
        assert!(!flags.workspace_notes);
    }

    #[test]
    fn each_keyword_sets_its_own_service() {
        for service in Service::ALL {
            for keyword in service.keywords() {
                let flags = classify(&format!("please use {keyword} for this"));
                assert!(flags.contains(service), "{keyword} should set {service:?}");
            }
        }
    }

    #[test]
    fn french_form_keyword_maps_to_webhook() {
        let flags = classify("Quand un formulaire est soumis");
        assert!(flags.generic_webhook);
        assert!(!flags.form_intake);
    }

    #[test]
    fn google_sheets_sets_spreadsheet() {
        let flags = classify("append a row to Google Sheets");
        assert!(flags.spreadsheet);
        assert_eq!(flags.services(), vec![Service::Spreadsheet]);
    }

    #[test]
    fn from_services_round_trips_through_contains() {
        let flags = ServiceFlags::from_services([Service::TeamChat, Service::FormIntake]);
        assert!(flags.contains(Service::TeamChat));
        assert!(flags.contains(Service::FormIntake));
        assert!(!flags.contains(Service::Mail));
    }
}
