// SPDX-FileCopyrightText: 2026 Omnigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed payloads published to operator consoles.

use omnigate_core::{ChannelId, ConversationId, EventKind, Message, MessageId, OmnigateError};
use serde::{Deserialize, Serialize};

/// Topic for one operator: `event.<kind>.<domain>.<user>`.
pub fn topic(kind: EventKind, domain_id: &str, user_id: &str) -> String {
    format!("event.{kind}.{domain_id}.{user_id}")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEvent {
    pub conversation_id: ConversationId,
    pub from_channel_id: ChannelId,
    pub message_id: MessageId,
    pub message_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_value: Option<String>,
}

impl MessageEvent {
    pub fn new(from_channel_id: &ChannelId, message: &Message) -> Self {
        Self {
            conversation_id: message.conversation_id.clone(),
            from_channel_id: from_channel_id.clone(),
            message_id: message.id.clone(),
            message_type: message.message_type().to_string(),
            message_value: message.payload.text().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseEvent {
    pub conversation_id: ConversationId,
    pub from_channel_id: ChannelId,
    pub cause: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinEvent {
    pub conversation_id: ConversationId,
    pub joined_channel_id: ChannelId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveEvent {
    pub conversation_id: ConversationId,
    pub leaved_channel_id: ChannelId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteEvent {
    pub conversation_id: ConversationId,
    pub invite_id: String,
    /// The invited operator.
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclineEvent {
    pub conversation_id: ConversationId,
    pub invite_id: String,
    /// The operator who declined.
    pub user_id: String,
}

/// Any payload the router publishes, keyed by its [`EventKind`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ConversationEvent {
    Message(MessageEvent),
    Close(CloseEvent),
    Join(JoinEvent),
    Leave(LeaveEvent),
    Invite(InviteEvent),
    Decline(DeclineEvent),
}

impl ConversationEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ConversationEvent::Message(_) => EventKind::Message,
            ConversationEvent::Close(_) => EventKind::CloseConversation,
            ConversationEvent::Join(_) => EventKind::JoinConversation,
            ConversationEvent::Leave(_) => EventKind::LeaveConversation,
            ConversationEvent::Invite(_) => EventKind::InviteConversation,
            ConversationEvent::Decline(_) => EventKind::DeclineInvite,
        }
    }

    pub fn conversation_id(&self) -> &ConversationId {
        match self {
            ConversationEvent::Message(e) => &e.conversation_id,
            ConversationEvent::Close(e) => &e.conversation_id,
            ConversationEvent::Join(e) => &e.conversation_id,
            ConversationEvent::Leave(e) => &e.conversation_id,
            ConversationEvent::Invite(e) => &e.conversation_id,
            ConversationEvent::Decline(e) => &e.conversation_id,
        }
    }

    /// Topic this event is published on for the given operator.
    pub fn topic_for(&self, domain_id: &str, user_id: &str) -> String {
        topic(self.kind(), domain_id, user_id)
    }

    pub fn to_json(&self) -> Result<serde_json::Value, OmnigateError> {
        Ok(serde_json::to_value(self)?)
    }
}
