// SPDX-FileCopyrightText: 2026 Omnigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Omnigate integration tests.
//!
//! Provides in-memory collaborators that record every call and can be told
//! to fail, so bridge and router behavior can be asserted without a database,
//! an engine cluster or real messaging platforms.
//!
//! # Components
//!
//! - [`MockStorage`] - conversations, channels and messages in memory
//! - [`MockConnector`] - captures outbound sends, optional failure or delay
//! - [`MockEngine`] - records Start / Break / ConfirmationMessage calls
//! - [`RecordingPublisher`] - captures notification topics and payloads
//! - [`MockFlowBridge`] - records what the router hands to the flow bridge

pub mod fixtures;
pub mod mock_connector;
pub mod mock_engine;
pub mod mock_flow;
pub mod mock_publisher;
pub mod mock_storage;

pub use mock_connector::MockConnector;
pub use mock_engine::{EngineCall, MockEngine};
pub use mock_flow::{FlowCall, MockFlowBridge};
pub use mock_publisher::RecordingPublisher;
pub use mock_storage::MockStorage;
