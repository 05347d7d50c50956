// SPDX-FileCopyrightText: 2026 Omnigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Engine call targeting.
//!
//! Start goes to any instance of the flow service, round-robin. Every later
//! call for a conversation is narrowed by a predicate to the single instance
//! recorded as its node affinity; when that instance is gone the call fails
//! with [`OmnigateError::Routing`] instead of picking another one.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use omnigate_config::model::FlowConfig;
use omnigate_core::deadline::bounded;
use omnigate_core::traits::engine::{BreakRequest, ConfirmationRequest, EngineInstance, StartRequest};
use omnigate_core::{EngineTransport, InstanceDirectory, OmnigateError};
use tracing::debug;

/// Predicate that keeps only the instance with the given id.
pub fn only(node_id: &str) -> impl Fn(&EngineInstance) -> bool + '_ {
    move |instance| instance.id == node_id
}

/// Directory lookup, instance selection and bounded calls to the flow engine.
pub struct FlowEngine {
    directory: Arc<dyn InstanceDirectory>,
    transport: Arc<dyn EngineTransport>,
    service: String,
    timeout: Duration,
    cursor: AtomicUsize,
}

impl FlowEngine {
    pub fn new(
        directory: Arc<dyn InstanceDirectory>,
        transport: Arc<dyn EngineTransport>,
        service: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            directory,
            transport,
            service: service.into(),
            timeout,
            cursor: AtomicUsize::new(0),
        }
    }

    pub fn from_config(
        directory: Arc<dyn InstanceDirectory>,
        transport: Arc<dyn EngineTransport>,
        config: &FlowConfig,
    ) -> Self {
        Self::new(
            directory,
            transport,
            config.service_name.clone(),
            config.call_timeout(),
        )
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Picks one instance among those accepted by `predicate`.
    pub async fn select<P>(&self, predicate: P) -> Result<EngineInstance, OmnigateError>
    where
        P: Fn(&EngineInstance) -> bool,
    {
        let candidates: Vec<EngineInstance> = self
            .directory
            .instances(&self.service)
            .await?
            .into_iter()
            .filter(|i| predicate(i))
            .collect();
        if candidates.is_empty() {
            return Err(OmnigateError::Routing(format!(
                "no eligible `{}` instance",
                self.service
            )));
        }
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % candidates.len();
        Ok(candidates[index].clone())
    }

    /// Starts a flow on any instance and returns the id of the one that accepted it.
    pub async fn start(&self, request: StartRequest) -> Result<String, OmnigateError> {
        let target = self.select(|_| true).await?;
        debug!(
            conversation_id = %request.conversation_id,
            node = %target.id,
            "starting flow"
        );
        bounded(self.timeout, self.transport.start(&target, request))
            .await?
            .into_result()?;
        Ok(target.id)
    }

    pub async fn break_flow(
        &self,
        node_id: &str,
        request: BreakRequest,
    ) -> Result<(), OmnigateError> {
        let target = self.sticky(node_id).await?;
        bounded(self.timeout, self.transport.break_flow(&target, request))
            .await?
            .into_result()
    }

    pub async fn confirm(
        &self,
        node_id: &str,
        request: ConfirmationRequest,
    ) -> Result<(), OmnigateError> {
        let target = self.sticky(node_id).await?;
        bounded(self.timeout, self.transport.confirmation_message(&target, request))
            .await?
            .into_result()
    }

    async fn sticky(&self, node_id: &str) -> Result<EngineInstance, OmnigateError> {
        match self.select(only(node_id)).await {
            Err(OmnigateError::Routing(_)) => Err(OmnigateError::Routing(format!(
                "engine node `{node_id}` is not registered for `{}`",
                self.service
            ))),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::StaticDirectory;
    use omnigate_core::{ConversationId, Message};
    use omnigate_test_utils::MockEngine;

    fn instance(id: &str) -> EngineInstance {
        EngineInstance {
            id: id.to_string(),
            address: format!("{id}:10021"),
        }
    }

    fn engine(instances: Vec<EngineInstance>, transport: Arc<MockEngine>) -> FlowEngine {
        FlowEngine::new(
            Arc::new(StaticDirectory::with_service("workflow", instances)),
            transport,
            "workflow",
            Duration::from_secs(5),
        )
    }

    fn start_request() -> StartRequest {
        let cid = ConversationId::from("c1");
        StartRequest {
            conversation_id: cid.clone(),
            profile_id: "p".into(),
            domain_id: "1".into(),
            message: Message::text(cid, None, "hi"),
        }
    }

    #[tokio::test]
    async fn start_rotates_over_instances() {
        let mock = Arc::new(MockEngine::new());
        let engine = engine(vec![instance("a"), instance("b")], mock.clone());
        let first = engine.start(start_request()).await.unwrap();
        let second = engine.start(start_request()).await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn empty_directory_is_routing_error() {
        let engine = engine(vec![], Arc::new(MockEngine::new()));
        assert!(engine.start(start_request()).await.unwrap_err().is_routing());
    }

    #[tokio::test]
    async fn sticky_call_hits_only_the_recorded_node() {
        let mock = Arc::new(MockEngine::new());
        let engine = engine(vec![instance("a"), instance("b"), instance("c")], mock.clone());
        for _ in 0..3 {
            engine
                .break_flow(
                    "b",
                    BreakRequest {
                        conversation_id: ConversationId::from("c1"),
                    },
                )
                .await
                .unwrap();
        }
        let breaks = mock.breaks().await;
        assert_eq!(breaks.len(), 3);
        assert!(breaks.iter().all(|(target, _)| target.id == "b"));
    }

    #[tokio::test]
    async fn unknown_node_never_falls_back() {
        let mock = Arc::new(MockEngine::new());
        let engine = engine(vec![instance("a")], mock.clone());
        let err = engine
            .break_flow(
                "gone",
                BreakRequest {
                    conversation_id: ConversationId::from("c1"),
                },
            )
            .await
            .unwrap_err();
        assert!(err.is_routing());
        assert!(mock.calls().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_engine_times_out() {
        let mock = Arc::new(MockEngine::new().with_delay(Duration::from_secs(30)));
        let engine = engine(vec![instance("a")], mock);
        let err = engine.start(start_request()).await.unwrap_err();
        assert!(matches!(err, OmnigateError::Timeout { .. }));
    }
}
