// SPDX-FileCopyrightText: 2026 Omnigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cache key layout, `namespace:identifier`.

use omnigate_core::{ConversationId, MessageId};

pub const SESSION_NAMESPACE: &str = "session_id";
pub const CONFIRMATION_NAMESPACE: &str = "confirmations";
pub const CACHED_MESSAGES_NAMESPACE: &str = "cached_messages";
pub const CONVERSATION_NODE_NAMESPACE: &str = "conversation_node";

pub fn session(session_id: &str) -> String {
    format!("{SESSION_NAMESPACE}:{session_id}")
}

pub fn confirmation(conversation_id: &ConversationId) -> String {
    format!("{CONFIRMATION_NAMESPACE}:{conversation_id}")
}

/// Bulk key for a conversation's buffer: `cached_messages:<conversation>`.
pub fn cached_messages(conversation_id: &ConversationId) -> String {
    format!("{CACHED_MESSAGES_NAMESPACE}:{conversation_id}")
}

pub fn cached_message(conversation_id: &ConversationId, message_id: &MessageId) -> String {
    format!("{CACHED_MESSAGES_NAMESPACE}:{conversation_id}:{message_id}")
}

/// Scan prefix for one conversation's buffer. The trailing separator keeps
/// conversation `1` from matching the messages of conversation `12`.
pub fn cached_messages_prefix(conversation_id: &ConversationId) -> String {
    format!("{}:", cached_messages(conversation_id))
}

pub fn conversation_node(conversation_id: &ConversationId) -> String {
    format!("{CONVERSATION_NODE_NAMESPACE}:{conversation_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_formats() {
        let c = ConversationId::from("42");
        assert_eq!(session("tg-100"), "session_id:tg-100");
        assert_eq!(confirmation(&c), "confirmations:42");
        assert_eq!(cached_messages(&c), "cached_messages:42");
        assert_eq!(
            cached_message(&c, &MessageId::from("m1")),
            "cached_messages:42:m1"
        );
        assert_eq!(conversation_node(&c), "conversation_node:42");
    }

    #[test]
    fn buffer_prefix_does_not_overlap_longer_ids() {
        let prefix = cached_messages_prefix(&ConversationId::from("1"));
        let other = cached_message(&ConversationId::from("12"), &MessageId::from("m"));
        assert!(!other.starts_with(&prefix));
    }
}
