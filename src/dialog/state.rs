//! Dialog identities and the persisted per-conversation dialog stack.

use serde::{Deserialize, Serialize};

use super::prompt::Prompt;
use crate::recognizer::Entity;

/// Every dialog the bot can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DialogId {
    Greeting,
    Profile,
    OpeningBalance,
    Finalization,
    Thanks,
    OpenAccount,
    GetMyBalance,
    /// Reply for unrecognized text (`"None"` on the wire, like the intent).
    #[serde(rename = "None")]
    NoMatch,
    Help,
    Cancel,
    Bye,
    DeleteProfile,
}

impl DialogId {
    /// Number of steps in the dialog. Resuming past the last step ends it.
    pub fn step_count(&self) -> usize {
        match self {
            Self::Profile | Self::OpeningBalance => 3,
            Self::Finalization | Self::OpenAccount | Self::GetMyBalance => 2,
            Self::Greeting
            | Self::Thanks
            | Self::NoMatch
            | Self::Help
            | Self::Cancel
            | Self::Bye
            | Self::DeleteProfile => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Greeting => "Greeting",
            Self::Profile => "Profile",
            Self::OpeningBalance => "OpeningBalance",
            Self::Finalization => "Finalization",
            Self::Thanks => "Thanks",
            Self::OpenAccount => "OpenAccount",
            Self::GetMyBalance => "GetMyBalance",
            Self::NoMatch => "None",
            Self::Help => "Help",
            Self::Cancel => "Cancel",
            Self::Bye => "Bye",
            Self::DeleteProfile => "DeleteProfile",
        }
    }
}

impl std::fmt::Display for DialogId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Arguments a dialog was begun with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DialogArgs {
    /// Entities recognized alongside the intent that started the dialog.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entities: Vec<Entity>,
    /// Dialog to run instead (honoured by Help).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<DialogId>,
}

impl DialogArgs {
    pub fn with_entities(entities: Vec<Entity>) -> Self {
        Self {
            entities,
            action: None,
        }
    }

    /// Arguments that make Help hand straight off to `action`, for callers
    /// that re-invoke a dialog through Help programmatically.
    pub fn with_action(action: DialogId) -> Self {
        Self {
            entities: Vec::new(),
            action: Some(action),
        }
    }

    /// First entity of the given type.
    pub fn find_entity(&self, entity_type: &str) -> Option<&Entity> {
        self.entities
            .iter()
            .find(|e| e.entity_type.eq_ignore_ascii_case(entity_type))
    }
}

/// One in-progress dialog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub dialog: DialogId,
    /// Index of the next step to run.
    pub step: usize,
    #[serde(default)]
    pub args: DialogArgs,
    /// The prompt this frame is suspended on, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub awaiting: Option<Prompt>,
}

impl Frame {
    pub fn new(dialog: DialogId, args: DialogArgs) -> Self {
        Self {
            dialog,
            step: 0,
            args,
            awaiting: None,
        }
    }

    /// Whether every step has run.
    pub fn is_finished(&self) -> bool {
        self.step >= self.dialog.step_count()
    }
}

/// The conversation's dialog stack; the last frame is active.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DialogStack {
    frames: Vec<Frame>,
}

impl DialogStack {
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// The active frame.
    pub fn top(&self) -> Option<&Frame> {
        self.frames.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut Frame> {
        self.frames.last_mut()
    }

    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    pub fn pop(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::prompt::Prompt;

    #[test]
    fn display_matches_serde() {
        let dialogs = [
            DialogId::Greeting,
            DialogId::Profile,
            DialogId::OpeningBalance,
            DialogId::Finalization,
            DialogId::Thanks,
            DialogId::OpenAccount,
            DialogId::GetMyBalance,
            DialogId::NoMatch,
            DialogId::Help,
            DialogId::Cancel,
            DialogId::Bye,
            DialogId::DeleteProfile,
        ];
        for dialog in dialogs {
            let json = serde_json::to_string(&dialog).unwrap();
            assert_eq!(json, format!("\"{dialog}\""));
            assert!(dialog.step_count() >= 1);
        }
    }

    #[test]
    fn frame_finishes_after_last_step() {
        let mut frame = Frame::new(DialogId::GetMyBalance, DialogArgs::default());
        assert!(!frame.is_finished());
        frame.step = 1;
        assert!(!frame.is_finished());
        frame.step = 2;
        assert!(frame.is_finished());
    }

    #[test]
    fn stack_push_pop_top() {
        let mut stack = DialogStack::default();
        assert!(stack.is_empty());
        stack.push(Frame::new(DialogId::OpenAccount, DialogArgs::default()));
        stack.push(Frame::new(DialogId::Profile, DialogArgs::default()));
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.top().unwrap().dialog, DialogId::Profile);

        stack.top_mut().unwrap().step = 1;
        let popped = stack.pop().unwrap();
        assert_eq!(popped.step, 1);
        assert_eq!(stack.top().unwrap().dialog, DialogId::OpenAccount);

        stack.clear();
        assert!(stack.top().is_none());
    }

    #[test]
    fn suspended_stack_survives_json() {
        let mut stack = DialogStack::default();
        let mut frame = Frame::new(
            DialogId::OpenAccount,
            DialogArgs::with_entities(vec![Entity::new("Account", "savings")]),
        );
        frame.step = 1;
        frame.awaiting = Some(Prompt::text("What's your name?"));
        stack.push(frame);

        let json = serde_json::to_string(&stack).unwrap();
        let parsed: DialogStack = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, stack);
        assert_eq!(
            parsed.top().unwrap().args.find_entity("account").unwrap().value,
            "savings"
        );
    }
}
