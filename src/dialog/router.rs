//! Routing table: literal commands, global triggers and intent → dialog map.
//!
//! Built once at startup and shared behind an `Arc`; nothing mutates it
//! afterwards.

use std::collections::HashMap;

use regex::Regex;
use tracing::debug;

use super::state::DialogId;
use crate::recognizer::IntentName;

/// How a matched trigger treats the dialog stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerMode {
    /// Push on top; the interrupted dialog resumes afterwards.
    Interrupt,
    /// Clear the stack first.
    Reset,
}

/// Result of matching message text against commands and triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub dialog: DialogId,
    pub mode: TriggerMode,
}

#[derive(Debug, Clone)]
struct TriggerRule {
    regex: Regex,
    route: Route,
}

/// Immutable mapping from inbound text to dialogs.
#[derive(Debug, Clone)]
pub struct RoutingTable {
    /// Checked before everything else, including triggers.
    commands: Vec<TriggerRule>,
    triggers: Vec<TriggerRule>,
    intents: HashMap<IntentName, DialogId>,
}

impl RoutingTable {
    /// The banking bot's routes.
    pub fn bank_default() -> Self {
        let commands = vec![TriggerRule {
            regex: Regex::new(r"(?i)^/deleteprofile$").unwrap(),
            route: Route {
                dialog: DialogId::DeleteProfile,
                mode: TriggerMode::Reset,
            },
        }];

        let triggers = vec![
            TriggerRule {
                regex: Regex::new(r"(?i)^help").unwrap(),
                route: Route {
                    dialog: DialogId::Help,
                    mode: TriggerMode::Interrupt,
                },
            },
            TriggerRule {
                regex: Regex::new(r"(?i)^cancel$").unwrap(),
                route: Route {
                    dialog: DialogId::Cancel,
                    mode: TriggerMode::Reset,
                },
            },
            TriggerRule {
                regex: Regex::new(r"(?i)^bye").unwrap(),
                route: Route {
                    dialog: DialogId::Bye,
                    mode: TriggerMode::Reset,
                },
            },
        ];

        let intents = HashMap::from([
            (IntentName::Thanks, DialogId::Thanks),
            (IntentName::OpenAccount, DialogId::OpenAccount),
            (IntentName::GetMyBalance, DialogId::GetMyBalance),
            (IntentName::Help, DialogId::Help),
            (IntentName::Cancel, DialogId::Cancel),
            (IntentName::Bye, DialogId::Bye),
            (IntentName::NoMatch, DialogId::NoMatch),
        ]);

        Self {
            commands,
            triggers,
            intents,
        }
    }

    /// Match a message against commands, then triggers, in order.
    pub fn match_message(&self, text: &str) -> Option<Route> {
        let text = text.trim();
        let hit = self
            .commands
            .iter()
            .chain(self.triggers.iter())
            .find(|rule| rule.regex.is_match(text))?;
        debug!(dialog = %hit.route.dialog, "Trigger matched");
        Some(hit.route)
    }

    /// Dialog for a recognized intent; unmapped intents get `None`.
    pub fn dialog_for_intent(&self, intent: IntentName) -> DialogId {
        self.intents
            .get(&intent)
            .copied()
            .unwrap_or(DialogId::NoMatch)
    }
}

impl Default for RoutingTable {
    fn default() -> Self {
        Self::bank_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dialog_for(text: &str) -> Option<DialogId> {
        RoutingTable::bank_default()
            .match_message(text)
            .map(|r| r.dialog)
    }

    #[test]
    fn delete_profile_command_is_exact() {
        let table = RoutingTable::bank_default();
        let route = table.match_message("/DeleteProfile").unwrap();
        assert_eq!(route.dialog, DialogId::DeleteProfile);
        assert_eq!(route.mode, TriggerMode::Reset);
        assert_eq!(dialog_for("  /deleteprofile "), Some(DialogId::DeleteProfile));
        assert_eq!(dialog_for("/deleteprofile now"), None);
    }

    #[test]
    fn help_is_prefix_and_interrupts() {
        let table = RoutingTable::bank_default();
        let route = table.match_message("Help me please").unwrap();
        assert_eq!(route.dialog, DialogId::Help);
        assert_eq!(route.mode, TriggerMode::Interrupt);
        assert_eq!(dialog_for("I need help"), None);
    }

    #[test]
    fn cancel_is_exact_and_bye_is_prefix() {
        assert_eq!(dialog_for("CANCEL"), Some(DialogId::Cancel));
        assert_eq!(dialog_for("cancel that"), None);
        assert_eq!(dialog_for("BYE now"), Some(DialogId::Bye));
        assert_eq!(dialog_for("goodbye"), None);
    }

    #[test]
    fn ordinary_text_matches_nothing() {
        assert_eq!(dialog_for("open account"), None);
        assert_eq!(dialog_for("500"), None);
    }

    #[test]
    fn intents_map_to_dialogs() {
        let table = RoutingTable::bank_default();
        assert_eq!(
            table.dialog_for_intent(IntentName::OpenAccount),
            DialogId::OpenAccount
        );
        assert_eq!(
            table.dialog_for_intent(IntentName::GetMyBalance),
            DialogId::GetMyBalance
        );
        assert_eq!(table.dialog_for_intent(IntentName::Thanks), DialogId::Thanks);
        assert_eq!(table.dialog_for_intent(IntentName::NoMatch), DialogId::NoMatch);
    }
}
