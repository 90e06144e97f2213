//! Intent recognition: maps free text to one of the bot's intents.
//!
//! The bot never classifies text itself. A LUIS-compatible endpoint does it
//! when `LUIS_MODEL_URL` is configured; otherwise a small keyword recognizer
//! stands in so the bot can be exercised offline.

pub mod keyword;
pub mod luis;

pub use keyword::KeywordRecognizer;
pub use luis::LuisRecognizer;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RecognizerError;

/// Entity type carrying an account kind ("savings", "IRA", ...).
pub const ACCOUNT_ENTITY: &str = "Account";

/// The fixed set of intents the bot understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntentName {
    Thanks,
    OpenAccount,
    GetMyBalance,
    Help,
    Cancel,
    Bye,
    /// Nothing recognized (`"None"` on the wire).
    #[serde(rename = "None")]
    NoMatch,
}

impl IntentName {
    /// Map a recognizer's intent label; unknown labels become `NoMatch`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Thanks" => Self::Thanks,
            "OpenAccount" => Self::OpenAccount,
            "GetMyBalance" => Self::GetMyBalance,
            "Help" => Self::Help,
            "Cancel" => Self::Cancel,
            "Bye" => Self::Bye,
            _ => Self::NoMatch,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Thanks => "Thanks",
            Self::OpenAccount => "OpenAccount",
            Self::GetMyBalance => "GetMyBalance",
            Self::Help => "Help",
            Self::Cancel => "Cancel",
            Self::Bye => "Bye",
            Self::NoMatch => "None",
        }
    }
}

impl std::fmt::Display for IntentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured value extracted alongside an intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl Entity {
    pub fn new(entity_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            value: value.into(),
            score: None,
        }
    }
}

/// Classification result for one message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub name: IntentName,
    pub score: f64,
    #[serde(default)]
    pub entities: Vec<Entity>,
}

impl Intent {
    pub fn new(name: IntentName, score: f64) -> Self {
        Self {
            name,
            score,
            entities: Vec::new(),
        }
    }

    /// The fallback classification.
    pub fn no_match() -> Self {
        Self::new(IntentName::NoMatch, 0.0)
    }

    pub fn with_entity(mut self, entity: Entity) -> Self {
        self.entities.push(entity);
        self
    }

    /// First entity of the given type.
    pub fn find_entity(&self, entity_type: &str) -> Option<&Entity> {
        self.entities
            .iter()
            .find(|e| e.entity_type.eq_ignore_ascii_case(entity_type))
    }
}

/// Backend-agnostic intent recognizer.
#[async_trait]
pub trait IntentRecognizer: Send + Sync {
    /// Recognizer name, for logs.
    fn name(&self) -> &str;

    /// Classify `text`.
    async fn recognize(&self, text: &str) -> Result<Intent, RecognizerError>;
}
