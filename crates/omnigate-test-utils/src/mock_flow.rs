// SPDX-FileCopyrightText: 2026 Omnigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recording stand-in for the flow bridge, used by router tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use omnigate_core::{ConversationId, FlowBridge, Message, OmnigateError};

#[derive(Debug, Clone, PartialEq)]
pub enum FlowCall {
    Start {
        conversation_id: ConversationId,
        profile_id: String,
        domain_id: String,
        message: Message,
    },
    Send {
        conversation_id: ConversationId,
        message: Message,
    },
    Close {
        conversation_id: ConversationId,
    },
}

#[derive(Debug, Default)]
pub struct MockFlowBridge {
    calls: Mutex<Vec<FlowCall>>,
    fail: AtomicBool,
    delay: Option<Duration>,
}

impl MockFlowBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleeps for `delay` before answering `send_message` and `close_conversation`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Makes `send_message` and `close_conversation` fail. `start` never
    /// reports failures.
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub async fn calls(&self) -> Vec<FlowCall> {
        self.calls.lock().await.clone()
    }

    async fn check(&self) -> Result<(), OmnigateError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(OmnigateError::Routing("mock flow bridge failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl FlowBridge for MockFlowBridge {
    async fn start(
        &self,
        conversation_id: &ConversationId,
        profile_id: &str,
        domain_id: &str,
        message: Message,
    ) {
        self.calls.lock().await.push(FlowCall::Start {
            conversation_id: conversation_id.clone(),
            profile_id: profile_id.to_string(),
            domain_id: domain_id.to_string(),
            message,
        });
    }

    async fn send_message(
        &self,
        conversation_id: &ConversationId,
        message: Message,
    ) -> Result<(), OmnigateError> {
        self.calls.lock().await.push(FlowCall::Send {
            conversation_id: conversation_id.clone(),
            message,
        });
        self.check().await
    }

    async fn close_conversation(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<(), OmnigateError> {
        self.calls.lock().await.push(FlowCall::Close {
            conversation_id: conversation_id.clone(),
        });
        self.check().await
    }
}
