// SPDX-FileCopyrightText: 2026 Omnigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock channel connector for deterministic testing.
//!
//! `MockConnector` captures every outbound send for assertion. It can be
//! switched to fail, or to stall for a fixed delay to exercise timeouts.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use omnigate_core::{Channel, ChannelType, ConnectorAdapter, Message, OmnigateError};

pub struct MockConnector {
    channel_type: ChannelType,
    sent: Mutex<Vec<(Channel, Message)>>,
    fail: AtomicBool,
    delay: Option<Duration>,
}

impl MockConnector {
    pub fn new(channel_type: ChannelType) -> Self {
        Self {
            channel_type,
            sent: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
            delay: None,
        }
    }

    /// A connector whose every send fails.
    pub fn failing(channel_type: ChannelType) -> Self {
        let connector = Self::new(channel_type);
        connector.set_failing(true);
        connector
    }

    /// Sleeps for `delay` before completing each send.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Successful sends, in order.
    pub async fn sent(&self) -> Vec<(Channel, Message)> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }
}

#[async_trait]
impl ConnectorAdapter for MockConnector {
    fn channel_type(&self) -> ChannelType {
        self.channel_type.clone()
    }

    async fn send_message(&self, channel: &Channel, message: &Message) -> Result<(), OmnigateError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(OmnigateError::Connector {
                channel_type: self.channel_type.to_string(),
                message: "mock connector failure".to_string(),
            });
        }
        self.sent
            .lock()
            .await
            .push((channel.clone(), message.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use omnigate_core::ConversationId;

    #[tokio::test]
    async fn captures_and_fails_on_demand() {
        let connector = MockConnector::new(ChannelType::Viber);
        let channel = fixtures::channel("v1", "c1", ChannelType::Viber, "u1");
        let msg = Message::text(ConversationId::from("c1"), None, "hey");

        connector.send_message(&channel, &msg).await.unwrap();
        connector.set_failing(true);
        assert!(connector.send_message(&channel, &msg).await.is_err());
        assert_eq!(connector.sent_count().await, 1);
    }
}
