//! Keyword recognizer: offline stand-in for the LUIS model.
//!
//! Fast regex rules covering the three domain intents. Anything else is
//! `NoMatch`; help/cancel/bye never reach a recognizer because the routing
//! table's triggers catch them first.

use async_trait::async_trait;
use regex::Regex;

use super::{ACCOUNT_ENTITY, Entity, Intent, IntentName, IntentRecognizer};
use crate::error::RecognizerError;
use crate::profile::AccountType;

/// A single intent rule with a compiled regex.
#[derive(Debug, Clone)]
struct KeywordRule {
    regex: Regex,
    intent: IntentName,
}

/// Regex-based recognizer used when no LUIS model is configured.
pub struct KeywordRecognizer {
    rules: Vec<KeywordRule>,
    account_regex: Regex,
}

impl KeywordRecognizer {
    /// Create a recognizer with the default banking rules.
    pub fn default_rules() -> Self {
        let rules = vec![
            KeywordRule {
                regex: Regex::new(r"(?i)\b(open|start|new|create)\b.*\baccount\b").unwrap(),
                intent: IntentName::OpenAccount,
            },
            KeywordRule {
                regex: Regex::new(r"(?i)\bbalance\b|\bhow much\b.*\bhave\b").unwrap(),
                intent: IntentName::GetMyBalance,
            },
            KeywordRule {
                regex: Regex::new(r"(?i)\b(thanks|thank you|thx|cheers)\b").unwrap(),
                intent: IntentName::Thanks,
            },
        ];
        let account_regex = Regex::new(r"(?i)\b(checking|savings|ira|credit|debit)\b").unwrap();
        Self {
            rules,
            account_regex,
        }
    }

    /// Classify synchronously.
    pub fn classify(&self, text: &str) -> Intent {
        let Some(rule) = self.rules.iter().find(|r| r.regex.is_match(text)) else {
            return Intent::no_match();
        };

        let mut intent = Intent::new(rule.intent, 1.0);
        let account = self
            .account_regex
            .find(text)
            .and_then(|m| m.as_str().parse::<AccountType>().ok());
        if let Some(account) = account {
            intent = intent.with_entity(Entity::new(ACCOUNT_ENTITY, account.label()));
        }
        intent
    }
}

impl Default for KeywordRecognizer {
    fn default() -> Self {
        Self::default_rules()
    }
}

#[async_trait]
impl IntentRecognizer for KeywordRecognizer {
    fn name(&self) -> &str {
        "keyword"
    }

    async fn recognize(&self, text: &str) -> Result<Intent, RecognizerError> {
        Ok(self.classify(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_account_phrases() {
        let r = KeywordRecognizer::default_rules();
        assert_eq!(r.classify("open account").name, IntentName::OpenAccount);
        assert_eq!(
            r.classify("I'd like to open a new account").name,
            IntentName::OpenAccount
        );
        assert_eq!(r.classify("Create an Account").name, IntentName::OpenAccount);
    }

    #[test]
    fn balance_phrases() {
        let r = KeywordRecognizer::default_rules();
        assert_eq!(r.classify("what's my balance").name, IntentName::GetMyBalance);
        assert_eq!(
            r.classify("how much money do I have").name,
            IntentName::GetMyBalance
        );
    }

    #[test]
    fn thanks_phrases() {
        let r = KeywordRecognizer::default_rules();
        assert_eq!(r.classify("thanks!").name, IntentName::Thanks);
        assert_eq!(r.classify("Thank you so much").name, IntentName::Thanks);
    }

    #[test]
    fn unrelated_text_is_no_match() {
        let r = KeywordRecognizer::default_rules();
        let intent = r.classify("what's the weather");
        assert_eq!(intent.name, IntentName::NoMatch);
        assert!(intent.entities.is_empty());
    }

    #[test]
    fn extracts_account_entity() {
        let r = KeywordRecognizer::default_rules();
        let intent = r.classify("open a new ira account");
        assert_eq!(intent.name, IntentName::OpenAccount);
        assert_eq!(intent.find_entity(ACCOUNT_ENTITY).unwrap().value, "IRA");

        let intent = r.classify("open an account");
        assert!(intent.find_entity(ACCOUNT_ENTITY).is_none());
    }

    #[tokio::test]
    async fn trait_recognize_matches_classify() {
        let r = KeywordRecognizer::default();
        let intent = r.recognize("balance please").await.unwrap();
        assert_eq!(intent.name, IntentName::GetMyBalance);
        assert_eq!(r.name(), "keyword");
    }
}
