// SPDX-FileCopyrightText: 2026 Omnigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification bus for the operator console fan-out.
//!
//! [`BroadcastBus`] is the in-process [`NotificationPublisher`]: every publish
//! becomes a [`Notification`] on a `tokio::sync::broadcast` channel. A
//! deployment talking to an external broker implements the same trait.

pub mod events;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use omnigate_core::{NotificationPublisher, OmnigateError};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, trace};

pub use events::{
    CloseEvent, ConversationEvent, DeclineEvent, InviteEvent, JoinEvent, LeaveEvent, MessageEvent,
    topic,
};

/// Default buffered notifications per subscriber before lagging.
pub const DEFAULT_CAPACITY: usize = 1024;

/// One published notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub topic: String,
    pub payload: serde_json::Value,
    pub published_at: DateTime<Utc>,
}

/// In-process broadcast implementation of [`NotificationPublisher`].
#[derive(Debug, Clone)]
pub struct BroadcastBus {
    sender: broadcast::Sender<Notification>,
}

impl BroadcastBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Receives every notification published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[async_trait]
impl NotificationPublisher for BroadcastBus {
    async fn publish(&self, topic: &str, payload: serde_json::Value) -> Result<(), OmnigateError> {
        let notification = Notification {
            id: uuid::Uuid::new_v4().to_string(),
            topic: topic.to_string(),
            payload,
            published_at: Utc::now(),
        };
        match self.sender.send(notification) {
            Ok(receivers) => trace!(topic, receivers, "notification published"),
            // No subscriber is listening; nothing to deliver to.
            Err(_) => debug!(topic, "notification dropped, no subscribers"),
        }
        Ok(())
    }
}
