// SPDX-FileCopyrightText: 2026 Omnigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification bus trait for operator-console fan-out.

use async_trait::async_trait;

use crate::error::OmnigateError;

/// Publishes JSON payloads to named topics (`event.<kind>.<domain>.<user>`).
#[async_trait]
pub trait NotificationPublisher: Send + Sync {
    async fn publish(&self, topic: &str, payload: serde_json::Value) -> Result<(), OmnigateError>;
}
