//! Rich card data model: attachment payloads carried on outbound messages.

use serde::{Deserialize, Serialize};

/// An image reference on a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardImage {
    pub url: String,
}

impl CardImage {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// A clickable action: a suggested reply button or a link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardAction {
    /// `imBack` (posts `value` back as the user's message) or `openUrl`.
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl CardAction {
    /// A button that sends `label` back as the user's reply.
    pub fn im_back(label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            kind: "imBack".to_string(),
            title: label.clone(),
            value: label,
            image: None,
        }
    }

    /// A button that opens `url`.
    pub fn open_url(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            kind: "openUrl".to_string(),
            title: title.into(),
            value: url.into(),
            image: None,
        }
    }

    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image = Some(url.into());
        self
    }
}

/// Card with a title, subtitle, body text, and thumbnail images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThumbnailCard {
    pub title: String,
    pub subtitle: String,
    pub text: String,
    #[serde(default)]
    pub images: Vec<CardImage>,
}

/// A key/value line on a receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fact {
    pub key: String,
    pub value: String,
}

impl Fact {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A purchased line item on a receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptItem {
    pub title: String,
    pub price: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<CardImage>,
}

/// Receipt summary: facts, line items, a total, and action buttons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptCard {
    pub title: String,
    #[serde(default)]
    pub facts: Vec<Fact>,
    #[serde(default)]
    pub items: Vec<ReceiptItem>,
    pub total: String,
    #[serde(default)]
    pub buttons: Vec<CardAction>,
}

/// A card attached to an outbound message.
///
/// Serialized in the connector's `{ "contentType": ..., "content": {...} }`
/// shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "contentType", content = "content")]
pub enum Attachment {
    #[serde(rename = "application/vnd.microsoft.card.thumbnail")]
    Thumbnail(ThumbnailCard),
    #[serde(rename = "application/vnd.microsoft.card.receipt")]
    Receipt(ReceiptCard),
}

impl Attachment {
    /// Render the card as plain text, for channels without card support.
    pub fn to_plain_text(&self) -> String {
        match self {
            Self::Thumbnail(card) => {
                format!("== {} ==\n{}\n{}", card.title, card.subtitle, card.text)
            }
            Self::Receipt(card) => {
                let mut lines = vec![format!("== {} ==", card.title)];
                for fact in &card.facts {
                    lines.push(format!("{}: {}", fact.key, fact.value));
                }
                for item in &card.items {
                    lines.push(format!("{} .... {}", item.title, item.price));
                }
                lines.push(format!("Total: {}", card.total));
                lines.join("\n")
            }
        }
    }
}
