// SPDX-FileCopyrightText: 2026 Omnigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lookup table from channel type to its connector.

use std::collections::HashMap;
use std::sync::Arc;

use crate::traits::ConnectorAdapter;
use crate::types::ChannelType;

/// Connectors keyed by the channel type they serve.
#[derive(Clone, Default)]
pub struct ConnectorRegistry {
    connectors: HashMap<ChannelType, Arc<dyn ConnectorAdapter>>,
}

impl ConnectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connector under its own channel type, replacing any previous one.
    pub fn register(&mut self, connector: Arc<dyn ConnectorAdapter>) {
        self.connectors.insert(connector.channel_type(), connector);
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, connector: Arc<dyn ConnectorAdapter>) -> Self {
        self.register(connector);
        self
    }

    pub fn get(&self, channel_type: &ChannelType) -> Option<Arc<dyn ConnectorAdapter>> {
        self.connectors.get(channel_type).cloned()
    }

    pub fn len(&self) -> usize {
        self.connectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connectors.is_empty()
    }
}

impl std::fmt::Debug for ConnectorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<&str> = self.connectors.keys().map(ChannelType::as_str).collect();
        types.sort_unstable();
        f.debug_struct("ConnectorRegistry")
            .field("types", &types)
            .finish()
    }
}
