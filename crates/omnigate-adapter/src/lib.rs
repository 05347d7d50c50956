// SPDX-FileCopyrightText: 2026 Omnigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Flow adapter service for the Omnigate chat gateway.
//!
//! [`FlowAdapterService`] is what the flow engine talks to: it starts flows
//! from the ingestion side, answers the engine's polls from the bridge cache,
//! and routes engine output back to the conversation's channel connector.

pub mod service;

pub use service::{FlowAdapterService, WaitReply};
