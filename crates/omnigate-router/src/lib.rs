// SPDX-FileCopyrightText: 2026 Omnigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event routing for the Omnigate chat gateway.
//!
//! - [`EventRouter`]: fans conversation events out to the other attached
//!   channels, or escalates to the flow bridge when nobody else is there
//! - [`InboundGateway`]: turns a connector's inbound message into a
//!   conversation, a started flow, or a routed message

pub mod gateway;
pub mod router;

pub use gateway::{InboundGateway, ProcessOutcome};
pub use router::{EventRouter, FanoutReport};
