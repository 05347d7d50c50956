// SPDX-FileCopyrightText: 2026 Omnigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway-side handle on a conversation's flow execution.

use async_trait::async_trait;

use crate::error::OmnigateError;
use crate::types::{ConversationId, Message};

/// What the event router and the inbound gateway need from the flow bridge.
#[async_trait]
pub trait FlowBridge: Send + Sync {
    /// Starts a flow for the conversation. Failures are logged, never returned.
    async fn start(
        &self,
        conversation_id: &ConversationId,
        profile_id: &str,
        domain_id: &str,
        message: Message,
    );

    /// Hands a message to the flow, either directly or through the buffer.
    async fn send_message(
        &self,
        conversation_id: &ConversationId,
        message: Message,
    ) -> Result<(), OmnigateError>;

    /// Breaks the remote execution and purges the conversation's bridge state.
    async fn close_conversation(&self, conversation_id: &ConversationId)
    -> Result<(), OmnigateError>;
}
