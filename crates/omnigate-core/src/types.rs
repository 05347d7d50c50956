// SPDX-FileCopyrightText: 2026 Omnigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat data model shared by the cache, the flow bridge and the event router.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Unique identifier for a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(pub String);

/// Unique identifier for a channel attached to a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(pub String);

/// Unique identifier for a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub String);

macro_rules! string_id {
    ($name:ident) => {
        impl $name {
            /// Generates a fresh random identifier.
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(ConversationId);
string_id!(ChannelId);
string_id!(MessageId);

/// Kind of participant endpoint. The set is open: unknown type names are
/// preserved verbatim in [`ChannelType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ChannelType {
    /// Operator console participant.
    Webitel,
    Telegram,
    Viber,
    WhatsApp,
    Facebook,
    InfobipWhatsApp,
    Other(String),
}

impl ChannelType {
    pub fn as_str(&self) -> &str {
        match self {
            ChannelType::Webitel => "webitel",
            ChannelType::Telegram => "telegram",
            ChannelType::Viber => "viber",
            ChannelType::WhatsApp => "whatsapp",
            ChannelType::Facebook => "facebook",
            ChannelType::InfobipWhatsApp => "infobip-whatsapp",
            ChannelType::Other(name) => name,
        }
    }

    /// Every type except the operator console is delivered through a bot connector.
    pub fn is_bot(&self) -> bool {
        !matches!(self, ChannelType::Webitel)
    }
}

impl fmt::Display for ChannelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for ChannelType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "webitel" => ChannelType::Webitel,
            "telegram" => ChannelType::Telegram,
            "viber" => ChannelType::Viber,
            "whatsapp" => ChannelType::WhatsApp,
            "facebook" => ChannelType::Facebook,
            "infobip-whatsapp" => ChannelType::InfobipWhatsApp,
            _ => ChannelType::Other(value),
        }
    }
}

impl From<&str> for ChannelType {
    fn from(value: &str) -> Self {
        ChannelType::from(value.to_string())
    }
}

impl From<ChannelType> for String {
    fn from(value: ChannelType) -> Self {
        match value {
            ChannelType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for ChannelType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ChannelType::from(s))
    }
}

/// A conversation between an external sender and whoever answers it
/// (operators, the flow engine, or both).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub profile_id: String,
    pub domain_id: String,
    /// Channel-specific external session identifier.
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
}

impl Conversation {
    /// Creates a new open conversation with a generated identifier.
    pub fn open(profile_id: &str, domain_id: &str, session_id: &str) -> Self {
        Self {
            id: ConversationId::generate(),
            profile_id: profile_id.to_string(),
            domain_id: domain_id.to_string(),
            session_id: session_id.to_string(),
            created_at: Utc::now(),
            closed_at: None,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed_at.is_some()
    }
}

/// A known external contact, keyed by the user id its channels carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    /// Identifier on the messaging platform (chat id, phone number, ...).
    pub external_id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// One participant endpoint attached to a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub id: ChannelId,
    pub conversation_id: ConversationId,
    #[serde(rename = "type")]
    pub channel_type: ChannelType,
    /// `true` for operator-side participants, `false` for external users.
    pub internal: bool,
    /// Channel-type-specific address, e.g. the bot profile id.
    pub connection: String,
    pub user_id: String,
    pub domain_id: String,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
}

impl Channel {
    pub fn is_closed(&self) -> bool {
        self.closed_at.is_some()
    }
}

/// Message payload, tagged by a `type` discriminator.
///
/// Payload kinds this build does not know decode to [`MessagePayload::Unsupported`]
/// instead of failing the whole message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessagePayload {
    Text { text: String },
    #[serde(other)]
    Unsupported,
}

impl MessagePayload {
    /// The discriminator value carried on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            MessagePayload::Text { .. } => "text",
            MessagePayload::Unsupported => "unsupported",
        }
    }

    /// The textual value, when the payload has one.
    pub fn text(&self) -> Option<&str> {
        match self {
            MessagePayload::Text { text } => Some(text),
            MessagePayload::Unsupported => None,
        }
    }
}

/// A message exchanged on a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    /// Originating channel; `None` for engine-originated output.
    #[serde(default)]
    pub channel_id: Option<ChannelId>,
    pub payload: MessagePayload,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Builds a text message with a generated id.
    pub fn text(
        conversation_id: ConversationId,
        channel_id: Option<ChannelId>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: MessageId::generate(),
            conversation_id,
            channel_id,
            payload: MessagePayload::Text { text: text.into() },
            created_at: Utc::now(),
        }
    }

    /// The message type tag (`"text"`, ...).
    pub fn message_type(&self) -> &'static str {
        self.payload.kind()
    }
}

/// An external sender as reported by a channel connector's inbound webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalSession {
    pub channel_type: ChannelType,
    /// Bot profile that received the message.
    pub profile_id: String,
    pub domain_id: String,
    /// Channel-specific session id (chat id, phone number, ...).
    pub session_id: String,
    /// External user id of the sender.
    pub user_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Conversation event kinds, also used as the first topic segment of
/// operator notifications.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Message,
    CloseConversation,
    JoinConversation,
    LeaveConversation,
    InviteConversation,
    DeclineInvite,
}

/// Filter for [`crate::traits::StorageAdapter::get_channels`].
///
/// Every `Some` field narrows the result. Closed channels are never returned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelFilter {
    pub user_id: Option<String>,
    pub conversation_id: Option<ConversationId>,
    pub connection: Option<String>,
    pub internal: Option<bool>,
    pub except_id: Option<ChannelId>,
}

impl ChannelFilter {
    /// All open channels of a conversation.
    pub fn conversation(conversation_id: &ConversationId) -> Self {
        Self {
            conversation_id: Some(conversation_id.clone()),
            ..Self::default()
        }
    }

    /// Excludes one channel from the result.
    pub fn except(mut self, channel_id: &ChannelId) -> Self {
        self.except_id = Some(channel_id.clone());
        self
    }

    /// Restricts to internal (`true`) or external (`false`) channels.
    pub fn internal(mut self, internal: bool) -> Self {
        self.internal = Some(internal);
        self
    }

    pub fn connection(mut self, connection: &str) -> Self {
        self.connection = Some(connection.to_string());
        self
    }

    /// Returns true if the channel passes every set criterion.
    pub fn matches(&self, channel: &Channel) -> bool {
        if channel.is_closed() {
            return false;
        }
        if let Some(ref user_id) = self.user_id
            && &channel.user_id != user_id
        {
            return false;
        }
        if let Some(ref conversation_id) = self.conversation_id
            && &channel.conversation_id != conversation_id
        {
            return false;
        }
        if let Some(ref connection) = self.connection
            && &channel.connection != connection
        {
            return false;
        }
        if let Some(internal) = self.internal
            && channel.internal != internal
        {
            return false;
        }
        if let Some(ref except_id) = self.except_id
            && &channel.id == except_id
        {
            return false;
        }
        true
    }
}
