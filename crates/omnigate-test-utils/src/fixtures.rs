// SPDX-FileCopyrightText: 2026 Omnigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builders for conversations and channels used across test suites.

use chrono::Utc;
use omnigate_core::{Channel, ChannelId, ChannelType, Conversation, ConversationId};

pub const DOMAIN: &str = "1";
pub const PROFILE: &str = "profile-1";

pub fn conversation(id: &str) -> Conversation {
    Conversation {
        id: ConversationId::from(id),
        profile_id: PROFILE.to_string(),
        domain_id: DOMAIN.to_string(),
        session_id: format!("session-{id}"),
        created_at: Utc::now(),
        closed_at: None,
    }
}

/// An open channel. Operator console channels are internal, every other
/// type is external.
pub fn channel(id: &str, conversation_id: &str, channel_type: ChannelType, user_id: &str) -> Channel {
    Channel {
        id: ChannelId::from(id),
        conversation_id: ConversationId::from(conversation_id),
        internal: !channel_type.is_bot(),
        channel_type,
        connection: PROFILE.to_string(),
        user_id: user_id.to_string(),
        domain_id: DOMAIN.to_string(),
        closed_at: None,
    }
}
