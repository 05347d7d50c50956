// SPDX-FileCopyrightText: 2026 Omnigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Flow bridge for the Omnigate chat gateway.
//!
//! Connects conversations to a polling flow engine:
//!
//! - [`FlowEngine`]: instance selection and timeouts; Start is round-robin,
//!   everything after it is pinned to the conversation's node affinity
//! - [`handshake`]: the confirmation-token / message-buffer exchange shared by
//!   the gateway client and the engine-facing adapter
//! - [`FlowBridgeClient`]: the [`omnigate_core::FlowBridge`] implementation
//! - [`StaticDirectory`]: configured instance list

pub mod client;
pub mod directory;
pub mod engine;
pub mod handshake;
pub mod state;

pub use client::FlowBridgeClient;
pub use directory::StaticDirectory;
pub use engine::FlowEngine;
pub use handshake::{Delivery, FlowContext};
pub use state::FlowState;
