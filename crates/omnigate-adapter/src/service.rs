// SPDX-FileCopyrightText: 2026 Omnigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The surface the flow engine calls into.

use std::sync::Arc;

use omnigate_cache::ChatCache;
use omnigate_config::model::AdapterConfig;
use omnigate_core::deadline::bounded;
use omnigate_core::{
    Channel, ChannelFilter, ConnectorRegistry, Conversation, ConversationId, FlowBridge, Message,
    OmnigateError, StorageAdapter,
};
use omnigate_flow::{Delivery, FlowBridgeClient, handshake};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Answer to one engine poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaitReply {
    pub messages: Vec<Message>,
    /// `0` when messages are returned, otherwise how long the engine should
    /// wait before polling again.
    pub timeout_sec: u64,
}

/// Engine-side half of the flow bridge.
pub struct FlowAdapterService {
    bridge: Arc<FlowBridgeClient>,
    storage: Arc<dyn StorageAdapter>,
    connectors: ConnectorRegistry,
    config: AdapterConfig,
}

impl FlowAdapterService {
    pub fn new(
        bridge: Arc<FlowBridgeClient>,
        storage: Arc<dyn StorageAdapter>,
        connectors: ConnectorRegistry,
        config: AdapterConfig,
    ) -> Self {
        Self {
            bridge,
            storage,
            connectors,
            config,
        }
    }

    fn cache(&self) -> &ChatCache {
        &self.bridge.context().cache
    }

    /// Starts a flow from the ingestion side. Failures are logged, not returned.
    pub async fn init(
        &self,
        conversation_id: &ConversationId,
        profile_id: &str,
        domain_id: &str,
        message: Message,
    ) {
        self.bridge
            .start(conversation_id, profile_id, domain_id, message)
            .await;
    }

    /// One poll round-trip. Never blocks; the engine drives the retry loop.
    pub async fn wait_message(
        &self,
        conversation_id: &ConversationId,
        confirmation_id: &str,
        timeout_sec: u64,
    ) -> Result<WaitReply, OmnigateError> {
        let messages = handshake::poll(self.cache(), conversation_id, confirmation_id).await?;
        if !messages.is_empty() {
            return Ok(WaitReply {
                messages,
                timeout_sec: 0,
            });
        }
        let timeout_sec = match timeout_sec {
            0 => self.config.default_wait_timeout_secs,
            requested => requested,
        };
        debug!(
            conversation_id = %conversation_id,
            confirmation_id,
            timeout_sec,
            "engine waiting for messages"
        );
        Ok(WaitReply {
            messages: Vec::new(),
            timeout_sec,
        })
    }

    /// Hands a message to the flow through the confirmation handshake.
    pub async fn send_message_to_flow(
        &self,
        conversation_id: &ConversationId,
        message: Message,
    ) -> Result<Delivery, OmnigateError> {
        self.bridge.deliver(conversation_id, message).await
    }

    /// Engine output: delivers each message to the conversation's external
    /// channel and persists it, whatever the connector outcome.
    pub async fn send_message(
        &self,
        conversation_id: &ConversationId,
        messages: Vec<Message>,
    ) -> Result<(), OmnigateError> {
        let limit = self.config.call_timeout();
        let conversation = bounded(limit, self.storage.get_conversation_by_id(conversation_id))
            .await?
            .ok_or_else(|| OmnigateError::NotFound {
                kind: "conversation",
                id: conversation_id.to_string(),
            })?;
        let channel = self.external_channel(&conversation).await?;

        for message in &messages {
            match &channel {
                Some(channel) => self.dispatch(channel, message).await,
                None => warn!(
                    conversation_id = %conversation_id,
                    message_id = %message.id,
                    "conversation has no open external channel"
                ),
            }
            bounded(limit, self.storage.create_message(message)).await?;
        }
        Ok(())
    }

    /// Purges the bridge cache and closes the conversation in storage.
    pub async fn close_conversation(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<(), OmnigateError> {
        let limit = self.config.call_timeout();
        let conversation =
            bounded(limit, self.storage.get_conversation_by_id(conversation_id)).await?;

        self.cache().purge_conversation(conversation_id).await?;
        if let Some(conversation) = &conversation {
            self.cache().delete_session(&conversation.session_id).await?;
        }
        bounded(limit, self.storage.close_conversation(conversation_id, None)).await?;
        info!(conversation_id = %conversation_id, "conversation closed by flow");
        Ok(())
    }

    /// The open external channel of the conversation, preferring the one
    /// bound to the conversation's own profile.
    async fn external_channel(
        &self,
        conversation: &Conversation,
    ) -> Result<Option<Channel>, OmnigateError> {
        let filter = ChannelFilter::conversation(&conversation.id).internal(false);
        let mut channels = bounded(
            self.config.call_timeout(),
            self.storage.get_channels(&filter),
        )
        .await?;
        let preferred = channels
            .iter()
            .position(|c| c.connection == conversation.profile_id)
            .unwrap_or(0);
        if channels.is_empty() {
            return Ok(None);
        }
        Ok(Some(channels.swap_remove(preferred)))
    }

    async fn dispatch(&self, channel: &Channel, message: &Message) {
        let Some(connector) = self.connectors.get(&channel.channel_type) else {
            warn!(
                conversation_id = %channel.conversation_id,
                channel_type = %channel.channel_type,
                "no connector registered for channel type"
            );
            return;
        };
        if let Err(e) = bounded(
            self.config.call_timeout(),
            connector.send_message(channel, message),
        )
        .await
        {
            warn!(
                conversation_id = %channel.conversation_id,
                channel_id = %channel.id,
                message_id = %message.id,
                error = %e,
                "connector delivery failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use omnigate_cache::MemoryStore;
    use omnigate_core::ChannelType;
    use omnigate_flow::{FlowContext, FlowEngine, StaticDirectory};
    use omnigate_test_utils::{MockEngine, MockStorage, fixtures};
    use tracing_test::traced_test;

    use super::*;

    fn adapter(storage: Arc<MockStorage>) -> FlowAdapterService {
        let engine = FlowEngine::new(
            Arc::new(StaticDirectory::new()),
            Arc::new(MockEngine::new()),
            "workflow",
            Duration::from_secs(1),
        );
        let cache = ChatCache::new(Arc::new(MemoryStore::new()), Duration::from_secs(60));
        let bridge = FlowBridgeClient::new(FlowContext::new(cache, Arc::new(engine)));
        FlowAdapterService::new(
            Arc::new(bridge),
            storage,
            ConnectorRegistry::new(),
            AdapterConfig::default(),
        )
    }

    #[tokio::test]
    #[traced_test]
    async fn missing_connector_is_logged() {
        let storage = Arc::new(MockStorage::new());
        storage.insert_conversation(fixtures::conversation("c1")).await;
        storage
            .insert_channel(fixtures::channel("ch", "c1", ChannelType::Viber, "u"))
            .await;
        let adapter = adapter(storage.clone());
        let cid = ConversationId::from("c1");

        adapter
            .send_message(&cid, vec![Message::text(cid.clone(), None, "hi")])
            .await
            .unwrap();

        assert!(logs_contain("no connector registered for channel type"));
        assert_eq!(storage.messages().await.len(), 1);
    }

    #[tokio::test]
    async fn init_failure_is_swallowed() {
        let adapter = adapter(Arc::new(MockStorage::new()));
        let cid = ConversationId::from("c1");
        adapter
            .init(&cid, "p", "1", Message::text(cid.clone(), None, "hi"))
            .await;
        assert!(adapter.cache().read_conversation_node(&cid).await.unwrap().is_none());
    }
}
