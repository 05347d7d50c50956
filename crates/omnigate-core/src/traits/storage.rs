// SPDX-FileCopyrightText: 2026 Omnigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for the relational chat store.

use async_trait::async_trait;

use crate::error::OmnigateError;
use crate::types::{Channel, ChannelFilter, Client, Conversation, ConversationId, Message};

/// Persistence collaborator for conversations, channels and messages.
#[async_trait]
pub trait StorageAdapter: Send + Sync {
    /// Returns the open channels matching `filter`.
    async fn get_channels(&self, filter: &ChannelFilter) -> Result<Vec<Channel>, OmnigateError>;

    async fn get_client_by_id(&self, id: &str) -> Result<Option<Client>, OmnigateError>;

    /// Looks up a conversation. A missing row is `Ok(None)`.
    async fn get_conversation_by_id(
        &self,
        id: &ConversationId,
    ) -> Result<Option<Conversation>, OmnigateError>;

    async fn create_conversation(&self, conversation: &Conversation) -> Result<(), OmnigateError>;

    async fn create_channel(&self, channel: &Channel) -> Result<(), OmnigateError>;

    async fn create_message(&self, message: &Message) -> Result<(), OmnigateError>;

    /// Marks the conversation and all of its channels closed.
    async fn close_conversation(
        &self,
        id: &ConversationId,
        cause: Option<&str>,
    ) -> Result<(), OmnigateError>;
}
