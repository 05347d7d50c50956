// SPDX-FileCopyrightText: 2026 Omnigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lifecycle of a conversation's flow execution, as seen from the gateway.

use strum::{AsRefStr, Display};

/// Bridge-side lifecycle of one conversation's flow.
///
/// `Starting` and `Closing` only exist while the corresponding engine call is
/// in flight. Once a close has purged the cache, the conversation looks
/// exactly like one that was never started, so [`crate::FlowBridgeClient::state`]
/// reports `New` for both; `Closed` is the state a successful close moves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum FlowState {
    New,
    Starting,
    /// Node affinity recorded, no outstanding poll.
    Active,
    /// Node affinity recorded and a confirmation token is waiting.
    EngineWaiting,
    Closing,
    Closed,
}

impl FlowState {
    /// State implied by the cache contents alone.
    pub fn from_cache(has_node: bool, has_token: bool) -> Self {
        match (has_node, has_token) {
            (false, _) => FlowState::New,
            (true, false) => FlowState::Active,
            (true, true) => FlowState::EngineWaiting,
        }
    }

    pub fn is_bound(self) -> bool {
        matches!(self, FlowState::Active | FlowState::EngineWaiting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_contents_map_to_states() {
        assert_eq!(FlowState::from_cache(false, false), FlowState::New);
        assert_eq!(FlowState::from_cache(true, false), FlowState::Active);
        assert_eq!(FlowState::from_cache(true, true), FlowState::EngineWaiting);
        assert!(FlowState::EngineWaiting.is_bound());
        assert!(!FlowState::Closing.is_bound());
        assert_eq!(FlowState::EngineWaiting.to_string(), "engine_waiting");
    }
}
