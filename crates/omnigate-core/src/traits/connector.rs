// SPDX-FileCopyrightText: 2026 Omnigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connector trait for external messaging platforms (Telegram, Viber, etc.).

use async_trait::async_trait;

use crate::error::OmnigateError;
use crate::types::{Channel, ChannelType, Message};

/// Outbound side of a bot channel integration.
///
/// The channel's `connection` carries the bot profile id and the connector
/// resolves the recipient from it and the conversation's session.
#[async_trait]
pub trait ConnectorAdapter: Send + Sync {
    /// The channel type this connector serves.
    fn channel_type(&self) -> ChannelType;

    /// Delivers a message to the external user behind `channel`.
    async fn send_message(&self, channel: &Channel, message: &Message)
    -> Result<(), OmnigateError>;
}
