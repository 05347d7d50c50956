// SPDX-FileCopyrightText: 2026 Omnigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Namespaced cache operations used by the flow bridge.

use std::sync::Arc;
use std::time::Duration;

use omnigate_config::model::CacheConfig;
use omnigate_core::{ConversationId, Message, MessageId, OmnigateError};
use tracing::debug;

use crate::keys;
use crate::store::{Guard, KvStore};

/// Bridge cache: sessions, confirmation tokens, buffered messages and engine
/// node affinity, all written with the same TTL.
#[derive(Clone)]
pub struct ChatCache {
    store: Arc<dyn KvStore>,
    ttl: Duration,
}

impl std::fmt::Debug for ChatCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCache").field("ttl", &self.ttl).finish()
    }
}

impl ChatCache {
    pub fn new(store: Arc<dyn KvStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn from_config(store: Arc<dyn KvStore>, config: &CacheConfig) -> Self {
        Self::new(store, config.ttl())
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    // --- session index ---

    pub async fn read_session(
        &self,
        session_id: &str,
    ) -> Result<Option<ConversationId>, OmnigateError> {
        Ok(self
            .store
            .get(&keys::session(session_id))
            .await?
            .map(ConversationId::from))
    }

    pub async fn write_session(
        &self,
        session_id: &str,
        conversation_id: &ConversationId,
    ) -> Result<(), OmnigateError> {
        self.store
            .set(&keys::session(session_id), conversation_id.as_str(), self.ttl)
            .await
    }

    pub async fn delete_session(&self, session_id: &str) -> Result<(), OmnigateError> {
        self.store.delete(&keys::session(session_id)).await
    }

    // --- confirmation token ---

    pub async fn read_confirmation(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Option<String>, OmnigateError> {
        self.store.get(&keys::confirmation(conversation_id)).await
    }

    pub async fn write_confirmation(
        &self,
        conversation_id: &ConversationId,
        confirmation_id: &str,
    ) -> Result<(), OmnigateError> {
        self.store
            .set(&keys::confirmation(conversation_id), confirmation_id, self.ttl)
            .await
    }

    pub async fn delete_confirmation(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<(), OmnigateError> {
        self.store.delete(&keys::confirmation(conversation_id)).await
    }

    /// Removes the token only if it is still `confirmation_id`. A newer token
    /// left by a later poll survives. Returns whether the token was removed.
    pub async fn consume_confirmation(
        &self,
        conversation_id: &ConversationId,
        confirmation_id: &str,
    ) -> Result<bool, OmnigateError> {
        self.store
            .delete_if(&keys::confirmation(conversation_id), confirmation_id)
            .await
    }

    /// Writes the token only while the conversation's buffer is empty.
    ///
    /// Returns `false` when a message was buffered first; the caller should
    /// drain the buffer instead of waiting.
    pub async fn write_confirmation_unless_buffered(
        &self,
        conversation_id: &ConversationId,
        confirmation_id: &str,
    ) -> Result<bool, OmnigateError> {
        let prefix = keys::cached_messages_prefix(conversation_id);
        self.store
            .set_guarded(
                &keys::confirmation(conversation_id),
                confirmation_id,
                self.ttl,
                Guard::PrefixEmpty(&prefix),
            )
            .await
    }

    // --- buffered messages ---

    /// Buffered messages of a conversation, oldest first.
    ///
    /// An entry that no longer decodes is a [`OmnigateError::Serialization`].
    pub async fn read_cached_messages(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Vec<Message>, OmnigateError> {
        let entries = self
            .store
            .scan_prefix(&keys::cached_messages_prefix(conversation_id))
            .await?;
        entries
            .into_iter()
            .map(|(_, raw)| serde_json::from_str(&raw).map_err(OmnigateError::from))
            .collect()
    }

    pub async fn write_cached_message(
        &self,
        conversation_id: &ConversationId,
        message: &Message,
    ) -> Result<(), OmnigateError> {
        let raw = serde_json::to_string(message)?;
        self.store
            .set(
                &keys::cached_message(conversation_id, &message.id),
                &raw,
                self.ttl,
            )
            .await
    }

    /// Buffers the message only while no confirmation token exists.
    ///
    /// Returns `false` when the engine started waiting first; the caller
    /// should deliver through the token instead.
    pub async fn write_cached_message_unless_confirmed(
        &self,
        conversation_id: &ConversationId,
        message: &Message,
    ) -> Result<bool, OmnigateError> {
        let raw = serde_json::to_string(message)?;
        let token = keys::confirmation(conversation_id);
        self.store
            .set_guarded(
                &keys::cached_message(conversation_id, &message.id),
                &raw,
                self.ttl,
                Guard::KeyAbsent(&token),
            )
            .await
    }

    pub async fn delete_cached_message(
        &self,
        conversation_id: &ConversationId,
        message_id: &MessageId,
    ) -> Result<(), OmnigateError> {
        self.store
            .delete(&keys::cached_message(conversation_id, message_id))
            .await
    }

    /// Deletes every buffered message of the conversation.
    pub async fn delete_cached_messages(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<(), OmnigateError> {
        let entries = self
            .store
            .scan_prefix(&keys::cached_messages_prefix(conversation_id))
            .await?;
        for (key, _) in &entries {
            self.store.delete(key).await?;
        }
        self.store
            .delete(&keys::cached_messages(conversation_id))
            .await?;
        debug!(
            conversation_id = %conversation_id,
            count = entries.len(),
            "cleared buffered messages"
        );
        Ok(())
    }

    // --- node affinity ---

    pub async fn read_conversation_node(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Option<String>, OmnigateError> {
        self.store
            .get(&keys::conversation_node(conversation_id))
            .await
    }

    pub async fn write_conversation_node(
        &self,
        conversation_id: &ConversationId,
        node_id: &str,
    ) -> Result<(), OmnigateError> {
        self.store
            .set(&keys::conversation_node(conversation_id), node_id, self.ttl)
            .await
    }

    pub async fn delete_conversation_node(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<(), OmnigateError> {
        self.store
            .delete(&keys::conversation_node(conversation_id))
            .await
    }

    /// Removes the token, the buffer and the node affinity of a conversation.
    pub async fn purge_conversation(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<(), OmnigateError> {
        self.delete_cached_messages(conversation_id).await?;
        self.delete_confirmation(conversation_id).await?;
        self.delete_conversation_node(conversation_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    fn cache() -> ChatCache {
        ChatCache::new(Arc::new(MemoryStore::new()), Duration::from_secs(60))
    }

    fn text(cid: &ConversationId, body: &str) -> Message {
        Message::text(cid.clone(), None, body)
    }

    #[tokio::test]
    async fn misses_are_none_or_empty() {
        let cache = cache();
        let cid = ConversationId::from("c1");
        assert!(cache.read_session("s").await.unwrap().is_none());
        assert!(cache.read_confirmation(&cid).await.unwrap().is_none());
        assert!(cache.read_conversation_node(&cid).await.unwrap().is_none());
        assert!(cache.read_cached_messages(&cid).await.unwrap().is_empty());
        cache.delete_confirmation(&cid).await.unwrap();
        cache.delete_cached_messages(&cid).await.unwrap();
    }

    #[tokio::test]
    async fn session_round_trip() {
        let cache = cache();
        let cid = ConversationId::from("c1");
        cache.write_session("tg-7", &cid).await.unwrap();
        assert_eq!(cache.read_session("tg-7").await.unwrap(), Some(cid));
        cache.delete_session("tg-7").await.unwrap();
        assert!(cache.read_session("tg-7").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn buffer_keeps_arrival_order_and_bulk_clears() {
        let cache = cache();
        let cid = ConversationId::from("c1");
        let other = ConversationId::from("c10");
        let bodies = ["one", "two", "three"];
        for body in bodies {
            cache.write_cached_message(&cid, &text(&cid, body)).await.unwrap();
        }
        cache
            .write_cached_message(&other, &text(&other, "elsewhere"))
            .await
            .unwrap();

        let read: Vec<String> = cache
            .read_cached_messages(&cid)
            .await
            .unwrap()
            .iter()
            .filter_map(|m| m.payload.text().map(str::to_string))
            .collect();
        assert_eq!(read, bodies);

        cache.delete_cached_messages(&cid).await.unwrap();
        assert!(cache.read_cached_messages(&cid).await.unwrap().is_empty());
        assert_eq!(cache.read_cached_messages(&other).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_single_cached_message() {
        let cache = cache();
        let cid = ConversationId::from("c1");
        let first = text(&cid, "a");
        let second = text(&cid, "b");
        cache.write_cached_message(&cid, &first).await.unwrap();
        cache.write_cached_message(&cid, &second).await.unwrap();

        cache.delete_cached_message(&cid, &first.id).await.unwrap();
        let left = cache.read_cached_messages(&cid).await.unwrap();
        assert_eq!(left, vec![second]);
    }

    #[tokio::test]
    async fn undecodable_entry_is_serialization_error() {
        let store = Arc::new(MemoryStore::new());
        let cache = ChatCache::new(store.clone(), Duration::from_secs(60));
        let cid = ConversationId::from("c1");
        store
            .set("cached_messages:c1:bad", "{not json", Duration::from_secs(60))
            .await
            .unwrap();
        let err = cache.read_cached_messages(&cid).await.unwrap_err();
        assert!(matches!(err, OmnigateError::Serialization(_)));
    }

    #[tokio::test]
    async fn token_and_buffer_exclude_each_other() {
        let cache = cache();
        let cid = ConversationId::from("c1");

        assert!(cache.write_confirmation_unless_buffered(&cid, "t1").await.unwrap());
        assert!(
            !cache
                .write_cached_message_unless_confirmed(&cid, &text(&cid, "late"))
                .await
                .unwrap()
        );
        assert!(cache.read_cached_messages(&cid).await.unwrap().is_empty());

        cache.delete_confirmation(&cid).await.unwrap();
        assert!(
            cache
                .write_cached_message_unless_confirmed(&cid, &text(&cid, "queued"))
                .await
                .unwrap()
        );
        assert!(!cache.write_confirmation_unless_buffered(&cid, "t2").await.unwrap());
        assert!(cache.read_confirmation(&cid).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn consuming_a_replaced_token_keeps_the_new_one() {
        let cache = cache();
        let cid = ConversationId::from("c1");
        cache.write_confirmation(&cid, "t1").await.unwrap();
        cache.write_confirmation(&cid, "t2").await.unwrap();

        assert!(!cache.consume_confirmation(&cid, "t1").await.unwrap());
        assert_eq!(cache.read_confirmation(&cid).await.unwrap().as_deref(), Some("t2"));
        assert!(cache.consume_confirmation(&cid, "t2").await.unwrap());
        assert!(cache.read_confirmation(&cid).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn purge_removes_all_bridge_state() {
        let cache = cache();
        let cid = ConversationId::from("c1");
        cache.write_conversation_node(&cid, "engine-1").await.unwrap();
        cache.write_confirmation(&cid, "t").await.unwrap();
        cache.write_cached_message(&cid, &text(&cid, "x")).await.unwrap();
        cache.write_session("s", &cid).await.unwrap();

        cache.purge_conversation(&cid).await.unwrap();

        assert!(cache.read_conversation_node(&cid).await.unwrap().is_none());
        assert!(cache.read_confirmation(&cid).await.unwrap().is_none());
        assert!(cache.read_cached_messages(&cid).await.unwrap().is_empty());
        // The session index is not bridge state.
        assert!(cache.read_session("s").await.unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn writes_use_configured_ttl() {
        let config = CacheConfig {
            ttl_secs: 10,
            sweep_interval_secs: 60,
        };
        let cache = ChatCache::from_config(Arc::new(MemoryStore::new()), &config);
        let cid = ConversationId::from("c1");
        cache.write_conversation_node(&cid, "engine-1").await.unwrap();

        tokio::time::advance(Duration::from_secs(11)).await;
        assert!(cache.read_conversation_node(&cid).await.unwrap().is_none());
    }
}
