// SPDX-FileCopyrightText: 2026 Omnigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway-side flow bridge.

use async_trait::async_trait;
use dashmap::DashMap;
use omnigate_core::traits::engine::{BreakRequest, StartRequest};
use omnigate_core::{ConversationId, FlowBridge, Message, OmnigateError};
use tracing::{debug, info, warn};

use crate::handshake::{self, Delivery, FlowContext};
use crate::state::FlowState;

/// Starts, feeds and tears down remote flow executions.
pub struct FlowBridgeClient {
    ctx: FlowContext,
    /// Conversations with a Start or Break call in flight.
    in_flight: DashMap<ConversationId, FlowState>,
}

impl FlowBridgeClient {
    pub fn new(ctx: FlowContext) -> Self {
        Self {
            ctx,
            in_flight: DashMap::new(),
        }
    }

    pub fn context(&self) -> &FlowContext {
        &self.ctx
    }

    /// Current lifecycle state, from in-flight calls first and cache contents otherwise.
    pub async fn state(&self, conversation_id: &ConversationId) -> Result<FlowState, OmnigateError> {
        if let Some(state) = self.in_flight.get(conversation_id) {
            return Ok(*state);
        }
        let cache = &self.ctx.cache;
        let has_node = cache.read_conversation_node(conversation_id).await?.is_some();
        let has_token = cache.read_confirmation(conversation_id).await?.is_some();
        Ok(FlowState::from_cache(has_node, has_token))
    }

    /// Like [`FlowBridge::send_message`], also reporting how the message went out.
    pub async fn deliver(
        &self,
        conversation_id: &ConversationId,
        message: Message,
    ) -> Result<Delivery, OmnigateError> {
        handshake::deliver(&self.ctx, conversation_id, message).await
    }

    async fn try_start(&self, request: StartRequest) -> Result<String, OmnigateError> {
        let conversation_id = request.conversation_id.clone();
        let node = self.ctx.engine.start(request).await?;
        self.ctx
            .cache
            .write_conversation_node(&conversation_id, &node)
            .await?;
        Ok(node)
    }
}

#[async_trait]
impl FlowBridge for FlowBridgeClient {
    async fn start(
        &self,
        conversation_id: &ConversationId,
        profile_id: &str,
        domain_id: &str,
        message: Message,
    ) {
        self.in_flight
            .insert(conversation_id.clone(), FlowState::Starting);
        let request = StartRequest {
            conversation_id: conversation_id.clone(),
            profile_id: profile_id.to_string(),
            domain_id: domain_id.to_string(),
            message,
        };
        let outcome = self.try_start(request).await;
        self.in_flight.remove(conversation_id);

        match outcome {
            Ok(node) => info!(
                conversation_id = %conversation_id,
                node = %node,
                "flow started"
            ),
            // The conversation carries on without a flow.
            Err(e) => warn!(
                conversation_id = %conversation_id,
                profile_id,
                error = %e,
                "failed to start flow"
            ),
        }
    }

    async fn send_message(
        &self,
        conversation_id: &ConversationId,
        message: Message,
    ) -> Result<(), OmnigateError> {
        self.deliver(conversation_id, message).await.map(|_| ())
    }

    async fn close_conversation(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<(), OmnigateError> {
        let node = self
            .ctx
            .cache
            .read_conversation_node(conversation_id)
            .await?
            .ok_or_else(|| {
                OmnigateError::Routing(format!(
                    "conversation {conversation_id} has no engine node to break"
                ))
            })?;

        self.in_flight
            .insert(conversation_id.clone(), FlowState::Closing);
        let outcome = self
            .ctx
            .engine
            .break_flow(
                &node,
                BreakRequest {
                    conversation_id: conversation_id.clone(),
                },
            )
            .await;
        self.in_flight.remove(conversation_id);
        // Cache stays intact on failure so a retry still finds the node.
        outcome?;

        self.ctx.cache.purge_conversation(conversation_id).await?;
        debug!(
            conversation_id = %conversation_id,
            node = %node,
            state = %FlowState::Closed,
            "flow closed"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use omnigate_cache::{ChatCache, MemoryStore};
    use omnigate_core::traits::engine::EngineInstance;
    use omnigate_test_utils::MockEngine;
    use tracing_test::traced_test;

    use super::*;
    use crate::directory::StaticDirectory;
    use crate::engine::FlowEngine;

    fn client(engine: Arc<MockEngine>) -> FlowBridgeClient {
        let directory = StaticDirectory::with_service(
            "workflow",
            vec![EngineInstance {
                id: "engine-1".into(),
                address: "127.0.0.1:10021".into(),
            }],
        );
        let engine = FlowEngine::new(
            Arc::new(directory),
            engine,
            "workflow",
            Duration::from_secs(5),
        );
        let cache = ChatCache::new(Arc::new(MemoryStore::new()), Duration::from_secs(600));
        FlowBridgeClient::new(FlowContext::new(cache, Arc::new(engine)))
    }

    #[tokio::test]
    #[traced_test]
    async fn failed_start_is_logged_and_leaves_conversation_unbound() {
        let engine = Arc::new(MockEngine::new());
        engine.set_transport_error(true);
        let client = client(engine.clone());
        let cid = ConversationId::from("c1");

        client
            .start(&cid, "p", "1", Message::text(cid.clone(), None, "hi"))
            .await;

        assert_eq!(client.state(&cid).await.unwrap(), FlowState::New);
        assert_eq!(engine.starts().await.len(), 1);
        assert!(logs_contain("failed to start flow"));
    }

    #[tokio::test]
    async fn start_records_node_affinity() {
        let engine = Arc::new(MockEngine::new());
        let client = client(engine);
        let cid = ConversationId::from("c1");

        client
            .start(&cid, "p", "1", Message::text(cid.clone(), None, "hi"))
            .await;

        let node = client
            .context()
            .cache
            .read_conversation_node(&cid)
            .await
            .unwrap();
        assert_eq!(node.as_deref(), Some("engine-1"));
        assert_eq!(client.state(&cid).await.unwrap(), FlowState::Active);
    }

    #[tokio::test]
    async fn close_without_node_is_routing_error() {
        let engine = Arc::new(MockEngine::new());
        let client = client(engine.clone());
        let err = client
            .close_conversation(&ConversationId::from("never-started"))
            .await
            .unwrap_err();
        assert!(err.is_routing());
        assert!(engine.calls().await.is_empty());
    }
}
