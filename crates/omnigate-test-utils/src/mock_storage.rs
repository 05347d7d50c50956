// SPDX-FileCopyrightText: 2026 Omnigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory storage adapter.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use omnigate_core::{
    Channel, ChannelFilter, Client, Conversation, ConversationId, Message, OmnigateError,
    StorageAdapter,
};

#[derive(Debug, Default)]
struct State {
    clients: HashMap<String, Client>,
    conversations: HashMap<ConversationId, Conversation>,
    channels: Vec<Channel>,
    messages: Vec<Message>,
    closed: Vec<(ConversationId, Option<String>)>,
}

/// A storage adapter backed by plain collections.
///
/// `close_conversation` stamps `closed_at` on the conversation and all of its
/// channels, so closed channels disappear from `get_channels` like they do in
/// a real store.
#[derive(Debug, Default)]
pub struct MockStorage {
    state: Mutex<State>,
    fail: AtomicBool,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail with a storage error.
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub async fn insert_client(&self, client: Client) {
        let mut state = self.state.lock().await;
        state.clients.insert(client.id.clone(), client);
    }

    pub async fn insert_conversation(&self, conversation: Conversation) {
        let mut state = self.state.lock().await;
        state
            .conversations
            .insert(conversation.id.clone(), conversation);
    }

    pub async fn insert_channel(&self, channel: Channel) {
        self.state.lock().await.channels.push(channel);
    }

    pub async fn conversation(&self, id: &ConversationId) -> Option<Conversation> {
        self.state.lock().await.conversations.get(id).cloned()
    }

    pub async fn conversations(&self) -> Vec<Conversation> {
        self.state.lock().await.conversations.values().cloned().collect()
    }

    /// All channels, open and closed.
    pub async fn channels(&self) -> Vec<Channel> {
        self.state.lock().await.channels.clone()
    }

    pub async fn messages(&self) -> Vec<Message> {
        self.state.lock().await.messages.clone()
    }

    /// Every `close_conversation` call with its cause, in call order.
    pub async fn close_calls(&self) -> Vec<(ConversationId, Option<String>)> {
        self.state.lock().await.closed.clone()
    }

    fn check(&self) -> Result<(), OmnigateError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(OmnigateError::storage("mock storage failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for MockStorage {
    async fn get_channels(&self, filter: &ChannelFilter) -> Result<Vec<Channel>, OmnigateError> {
        self.check()?;
        let state = self.state.lock().await;
        Ok(state
            .channels
            .iter()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect())
    }

    async fn get_client_by_id(&self, id: &str) -> Result<Option<Client>, OmnigateError> {
        self.check()?;
        Ok(self.state.lock().await.clients.get(id).cloned())
    }

    async fn get_conversation_by_id(
        &self,
        id: &ConversationId,
    ) -> Result<Option<Conversation>, OmnigateError> {
        self.check()?;
        Ok(self.state.lock().await.conversations.get(id).cloned())
    }

    async fn create_conversation(&self, conversation: &Conversation) -> Result<(), OmnigateError> {
        self.check()?;
        self.insert_conversation(conversation.clone()).await;
        Ok(())
    }

    async fn create_channel(&self, channel: &Channel) -> Result<(), OmnigateError> {
        self.check()?;
        self.insert_channel(channel.clone()).await;
        Ok(())
    }

    async fn create_message(&self, message: &Message) -> Result<(), OmnigateError> {
        self.check()?;
        self.state.lock().await.messages.push(message.clone());
        Ok(())
    }

    async fn close_conversation(
        &self,
        id: &ConversationId,
        cause: Option<&str>,
    ) -> Result<(), OmnigateError> {
        self.check()?;
        let now = Utc::now();
        let mut state = self.state.lock().await;
        if let Some(conversation) = state.conversations.get_mut(id) {
            conversation.closed_at.get_or_insert(now);
        }
        for channel in state.channels.iter_mut().filter(|c| &c.conversation_id == id) {
            channel.closed_at.get_or_insert(now);
        }
        state.closed.push((id.clone(), cause.map(str::to_string)));
        Ok(())
    }
}
