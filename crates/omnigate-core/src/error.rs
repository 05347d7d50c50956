// SPDX-FileCopyrightText: 2026 Omnigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Omnigate chat gateway.
//!
//! A cache miss is never an error: cache reads return `Ok(None)` or an empty
//! list. Everything else that can go wrong on the bridge maps to one variant
//! of [`OmnigateError`].

use thiserror::Error;

/// The primary error type used across all Omnigate traits and components.
#[derive(Debug, Error)]
pub enum OmnigateError {
    /// Transport or RPC failure while calling a remote service.
    #[error("remote call to {service} failed: {source}")]
    RemoteCall {
        service: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The remote peer answered with a structured error payload.
    #[error("remote error {id}: {detail}")]
    RemoteLogic { id: String, detail: String },

    /// The backing key-value store failed.
    #[error("cache store error: {source}")]
    CacheStore {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// No node affinity where one is required, or no eligible engine instance.
    #[error("routing error: {0}")]
    Routing(String),

    /// Payload encode/decode failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Persistence collaborator failure.
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A record that must exist was not found in storage.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Channel connector failed to deliver.
    #[error("connector error ({channel_type}): {message}")]
    Connector {
        channel_type: String,
        message: String,
    },

    /// Notification bus publish failure.
    #[error("notification publish to {topic} failed: {message}")]
    Notification { topic: String, message: String },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Configuration errors surfaced at runtime.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl OmnigateError {
    /// Wraps any error as a cache store failure.
    pub fn cache(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        OmnigateError::CacheStore {
            source: source.into(),
        }
    }

    /// Wraps any error as a storage failure.
    pub fn storage(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        OmnigateError::Storage {
            source: source.into(),
        }
    }

    /// Returns true for errors caused by missing or unusable node affinity.
    pub fn is_routing(&self) -> bool {
        matches!(self, OmnigateError::Routing(_))
    }
}
