//! LUIS recognizer: queries a LUIS v2 endpoint over HTTP.

use async_trait::async_trait;
use reqwest::Url;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use super::{Entity, Intent, IntentName, IntentRecognizer};
use crate::error::RecognizerError;

/// Top-intent scores below this are treated as no match.
pub const INTENT_THRESHOLD: f64 = 0.1;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LuisResponse {
    #[serde(default)]
    top_scoring_intent: Option<LuisIntent>,
    #[serde(default)]
    intents: Vec<LuisIntent>,
    #[serde(default)]
    entities: Vec<LuisEntity>,
}

#[derive(Debug, Deserialize)]
struct LuisIntent {
    intent: String,
    #[serde(default)]
    score: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct LuisEntity {
    entity: String,
    #[serde(rename = "type")]
    entity_type: String,
    #[serde(default)]
    score: Option<f64>,
    #[serde(default)]
    resolution: Option<serde_json::Value>,
}

impl LuisEntity {
    /// Canonical value for list entities, otherwise the matched text.
    fn value(&self) -> String {
        self.resolution
            .as_ref()
            .and_then(|r| r.get("values"))
            .and_then(|v| v.get(0))
            .and_then(|v| v.as_str())
            .map(String::from)
            .unwrap_or_else(|| self.entity.clone())
    }
}

/// Recognizer backed by a LUIS application endpoint.
pub struct LuisRecognizer {
    client: reqwest::Client,
    /// Full endpoint URL, subscription key included.
    model_url: SecretString,
}

impl LuisRecognizer {
    /// Create a recognizer for `model_url`. The URL is validated up front.
    pub fn new(model_url: SecretString) -> Result<Self, RecognizerError> {
        Url::parse(model_url.expose_secret())
            .map_err(|e| RecognizerError::InvalidModelUrl(e.to_string()))?;
        Ok(Self {
            client: reqwest::Client::new(),
            model_url,
        })
    }

    /// Endpoint URL for `utterance`, replacing any `q` already present.
    fn query_url(&self, utterance: &str) -> Result<Url, RecognizerError> {
        let mut url = Url::parse(self.model_url.expose_secret())
            .map_err(|e| RecognizerError::InvalidModelUrl(e.to_string()))?;
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| k != "q")
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        url.query_pairs_mut()
            .clear()
            .extend_pairs(kept.iter())
            .append_pair("q", utterance);
        Ok(url)
    }
}

#[async_trait]
impl IntentRecognizer for LuisRecognizer {
    fn name(&self) -> &str {
        "luis"
    }

    async fn recognize(&self, text: &str) -> Result<Intent, RecognizerError> {
        let url = self.query_url(text)?;
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| RecognizerError::RequestFailed {
                recognizer: "luis".into(),
                reason: e.without_url().to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RecognizerError::RequestFailed {
                recognizer: "luis".into(),
                reason: format!("HTTP {status}"),
            });
        }

        let body: serde_json::Value =
            resp.json()
                .await
                .map_err(|e| RecognizerError::InvalidResponse {
                    recognizer: "luis".into(),
                    reason: e.without_url().to_string(),
                })?;

        let intent = parse_response(body)?;
        debug!(intent = %intent.name, score = intent.score, "LUIS recognized intent");
        Ok(intent)
    }
}

/// Turn a LUIS v2 response body into an `Intent`.
pub fn parse_response(body: serde_json::Value) -> Result<Intent, RecognizerError> {
    let response: LuisResponse =
        serde_json::from_value(body).map_err(|e| RecognizerError::InvalidResponse {
            recognizer: "luis".into(),
            reason: e.to_string(),
        })?;

    let top = response.top_scoring_intent.or_else(|| {
        response.intents.into_iter().max_by(|a, b| {
            a.score
                .unwrap_or(0.0)
                .total_cmp(&b.score.unwrap_or(0.0))
        })
    });

    let (name, score) = match top {
        Some(top) => {
            let score = top.score.unwrap_or(1.0);
            if score < INTENT_THRESHOLD {
                (IntentName::NoMatch, score)
            } else {
                (IntentName::from_label(&top.intent), score)
            }
        }
        None => (IntentName::NoMatch, 0.0),
    };

    let entities = response
        .entities
        .iter()
        .map(|e| Entity {
            entity_type: e.entity_type.clone(),
            value: e.value(),
            score: e.score,
        })
        .collect();

    Ok(Intent {
        name,
        score,
        entities,
    })
}
