// SPDX-FileCopyrightText: 2026 Omnigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits for the Omnigate gateway.
//!
//! Everything the bridge talks to over the network is behind one of these
//! traits and uses `#[async_trait]` for dynamic dispatch compatibility.

pub mod connector;
pub mod engine;
pub mod flow;
pub mod notify;
pub mod storage;

pub use connector::ConnectorAdapter;
pub use engine::{EngineTransport, InstanceDirectory};
pub use flow::FlowBridge;
pub use notify::NotificationPublisher;
pub use storage::StorageAdapter;
