//! Prompts the bot asks and the structured answers parsed from replies.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::channels::Activity;

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?\d[\d,]*(?:\.\d+)?").unwrap());

/// What kind of answer a prompt expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PromptKind {
    Text,
    Number,
    Choice { choices: Vec<String> },
}

/// A question the bot is waiting on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    pub text: String,
    #[serde(flatten)]
    pub kind: PromptKind,
}

/// A parsed answer to a prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptResult {
    Text(String),
    Number(Decimal),
    Choice { index: usize, value: String },
}

impl PromptResult {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_choice(&self) -> Option<&str> {
        match self {
            Self::Choice { value, .. } => Some(value),
            _ => None,
        }
    }
}

impl Prompt {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: PromptKind::Text,
        }
    }

    pub fn number(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: PromptKind::Number,
        }
    }

    pub fn choice(text: impl Into<String>, choices: Vec<String>) -> Self {
        Self {
            text: text.into(),
            kind: PromptKind::Choice { choices },
        }
    }

    /// Yes/No confirmation.
    pub fn confirm(text: impl Into<String>) -> Self {
        Self::choice(text, vec!["Yes".to_string(), "No".to_string()])
    }

    /// The outbound message asking this prompt.
    pub fn to_activity(&self) -> Activity {
        let activity = Activity::outgoing(self.text.clone());
        match &self.kind {
            PromptKind::Choice { choices } => activity.with_choices(choices),
            _ => activity,
        }
    }

    /// Parse a reply. `None` means the reply doesn't answer the prompt.
    pub fn parse(&self, input: &str) -> Option<PromptResult> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }
        match &self.kind {
            PromptKind::Text => Some(PromptResult::Text(input.to_string())),
            PromptKind::Number => parse_number(input).map(PromptResult::Number),
            PromptKind::Choice { choices } => parse_choice(choices, input),
        }
    }
}

/// First decimal number in `input`; thousands separators are allowed.
fn parse_number(input: &str) -> Option<Decimal> {
    let found = NUMBER_RE.find(input)?;
    let digits: String = found.as_str().chars().filter(|c| *c != ',').collect();
    Decimal::from_str(&digits).ok()
}

/// Match a choice by label (case-insensitive) or by 1-based index.
fn parse_choice(choices: &[String], input: &str) -> Option<PromptResult> {
    let by_label = choices
        .iter()
        .position(|c| c.eq_ignore_ascii_case(input));
    let index = by_label.or_else(|| {
        input
            .parse::<usize>()
            .ok()
            .filter(|n| (1..=choices.len()).contains(n))
            .map(|n| n - 1)
    })?;
    Some(PromptResult::Choice {
        index,
        value: choices[index].clone(),
    })
}
