//! Activity wire model: what the messaging endpoint receives and returns.
//!
//! Mirrors the connector's camelCase JSON activity shape. Only the fields the
//! bot reads or writes are modelled; unknown fields are ignored on input.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cards::{Attachment, CardAction};

/// Kind of activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActivityType {
    Message,
    ConversationUpdate,
    DeleteUserData,
    EndOfConversation,
    Typing,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for ActivityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Message => "message",
            Self::ConversationUpdate => "conversationUpdate",
            Self::DeleteUserData => "deleteUserData",
            Self::EndOfConversation => "endOfConversation",
            Self::Typing => "typing",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// A participant: the user or the bot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelAccount {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ChannelAccount {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }
}

/// The conversation an activity belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationAccount {
    pub id: String,
}

/// Buttons offered alongside a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedActions {
    pub actions: Vec<CardAction>,
}

/// An inbound or outbound activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(rename = "type")]
    pub kind: ActivityType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_url: Option<String>,
    #[serde(default)]
    pub from: ChannelAccount,
    #[serde(default)]
    pub recipient: ChannelAccount,
    #[serde(default)]
    pub conversation: ConversationAccount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members_added: Vec<ChannelAccount>,
    /// Outbound cards. User-sent attachments are not read.
    #[serde(default, skip_deserializing, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_actions: Option<SuggestedActions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_id: Option<String>,
    /// End-of-conversation code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl Activity {
    fn blank(kind: ActivityType) -> Self {
        Self {
            kind,
            id: None,
            timestamp: None,
            channel_id: None,
            service_url: None,
            from: ChannelAccount::default(),
            recipient: ChannelAccount::default(),
            conversation: ConversationAccount::default(),
            text: None,
            members_added: Vec::new(),
            attachments: Vec::new(),
            suggested_actions: None,
            reply_to_id: None,
            code: None,
        }
    }

    /// An inbound user message.
    pub fn message(
        conversation_id: impl Into<String>,
        user_id: impl Into<String>,
        bot_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        let mut activity = Self::blank(ActivityType::Message);
        activity.id = Some(Uuid::new_v4().to_string());
        activity.timestamp = Some(Utc::now());
        activity.conversation.id = conversation_id.into();
        activity.from = ChannelAccount::new(user_id);
        activity.recipient = ChannelAccount::new(bot_id);
        activity.text = Some(text.into());
        activity
    }

    /// An inbound membership change announcing that `members` joined.
    pub fn conversation_update(
        conversation_id: impl Into<String>,
        user_id: impl Into<String>,
        bot_id: impl Into<String>,
        members: Vec<ChannelAccount>,
    ) -> Self {
        let mut activity = Self::blank(ActivityType::ConversationUpdate);
        activity.id = Some(Uuid::new_v4().to_string());
        activity.conversation.id = conversation_id.into();
        activity.from = ChannelAccount::new(user_id);
        activity.recipient = ChannelAccount::new(bot_id);
        activity.members_added = members;
        activity
    }

    /// An inbound platform request to forget a user's data.
    pub fn delete_user_data(
        conversation_id: impl Into<String>,
        user_id: impl Into<String>,
        bot_id: impl Into<String>,
    ) -> Self {
        let mut activity = Self::blank(ActivityType::DeleteUserData);
        activity.id = Some(Uuid::new_v4().to_string());
        activity.conversation.id = conversation_id.into();
        activity.from = ChannelAccount::new(user_id);
        activity.recipient = ChannelAccount::new(bot_id);
        activity
    }

    /// An unaddressed outbound text message.
    pub fn outgoing(text: impl Into<String>) -> Self {
        let mut activity = Self::blank(ActivityType::Message);
        activity.text = Some(text.into());
        activity
    }

    /// An unaddressed outbound message carrying a single card.
    pub fn outgoing_card(attachment: Attachment) -> Self {
        let mut activity = Self::blank(ActivityType::Message);
        activity.attachments.push(attachment);
        activity
    }

    /// An unaddressed end-of-conversation notice.
    pub fn end_of_conversation() -> Self {
        let mut activity = Self::blank(ActivityType::EndOfConversation);
        activity.code = Some("completedSuccessfully".to_string());
        activity
    }

    /// Attach suggested reply buttons, one per label.
    pub fn with_choices(mut self, labels: &[String]) -> Self {
        self.suggested_actions = Some(SuggestedActions {
            actions: labels.iter().map(CardAction::im_back).collect(),
        });
        self
    }

    /// Message text, or the empty string.
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }

    /// Whether this membership update announces the bot itself joining.
    pub fn bot_was_added(&self) -> bool {
        self.kind == ActivityType::ConversationUpdate
            && self.members_added.iter().any(|m| m.id == self.recipient.id)
    }

    /// Address `reply` back to the sender of `self`.
    pub fn address_reply(&self, mut reply: Activity) -> Activity {
        reply.id = Some(Uuid::new_v4().to_string());
        reply.timestamp = Some(Utc::now());
        reply.channel_id = self.channel_id.clone();
        reply.service_url = self.service_url.clone();
        reply.from = self.recipient.clone();
        reply.recipient = self.from.clone();
        reply.conversation = self.conversation.clone();
        reply.reply_to_id = self.id.clone();
        reply
    }
}
