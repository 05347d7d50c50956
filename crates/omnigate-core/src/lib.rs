// SPDX-FileCopyrightText: 2026 Omnigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Omnigate chat gateway.
//!
//! This crate provides the chat data model, the error taxonomy, and the
//! collaborator traits (storage, connectors, flow engine transport, instance
//! directory, notification bus) that the bridge components are written
//! against.

pub mod deadline;
pub mod error;
pub mod registry;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::OmnigateError;
pub use registry::ConnectorRegistry;
pub use types::{
    Channel, ChannelFilter, ChannelId, ChannelType, Client, Conversation, ConversationId,
    EventKind, ExternalSession, Message, MessageId, MessagePayload,
};

pub use traits::{
    ConnectorAdapter, EngineTransport, FlowBridge, InstanceDirectory, NotificationPublisher,
    StorageAdapter,
};
