// SPDX-FileCopyrightText: 2026 Omnigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification publisher that records instead of publishing.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use omnigate_core::{NotificationPublisher, OmnigateError};

/// Captures `(topic, payload)` pairs instead of publishing them.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    published: Mutex<Vec<(String, serde_json::Value)>>,
    fail: AtomicBool,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub async fn published(&self) -> Vec<(String, serde_json::Value)> {
        self.published.lock().await.clone()
    }

    pub async fn topics(&self) -> Vec<String> {
        self.published
            .lock()
            .await
            .iter()
            .map(|(topic, _)| topic.clone())
            .collect()
    }
}

#[async_trait]
impl NotificationPublisher for RecordingPublisher {
    async fn publish(&self, topic: &str, payload: serde_json::Value) -> Result<(), OmnigateError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(OmnigateError::Notification {
                topic: topic.to_string(),
                message: "mock publisher failure".to_string(),
            });
        }
        self.published
            .lock()
            .await
            .push((topic.to_string(), payload));
        Ok(())
    }
}
