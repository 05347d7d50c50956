// SPDX-FileCopyrightText: 2026 Omnigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Flow engine RPC surface and the instance directory used to address it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::OmnigateError;
use crate::types::{ConversationId, Message};

/// One running flow engine process as listed by the service directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineInstance {
    pub id: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartRequest {
    pub conversation_id: ConversationId,
    pub profile_id: String,
    pub domain_id: String,
    pub message: Message,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakRequest {
    pub conversation_id: ConversationId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmationRequest {
    pub conversation_id: ConversationId,
    pub confirmation_id: String,
    pub messages: Vec<Message>,
}

/// Structured error returned by the engine inside an otherwise successful call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineFault {
    pub id: String,
    pub detail: String,
}

/// Reply envelope shared by all engine calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineReply {
    #[serde(default)]
    pub error: Option<EngineFault>,
}

impl EngineReply {
    pub fn ok() -> Self {
        Self { error: None }
    }

    pub fn fault(id: &str, detail: &str) -> Self {
        Self {
            error: Some(EngineFault {
                id: id.to_string(),
                detail: detail.to_string(),
            }),
        }
    }

    /// Turns an engine-reported fault into [`OmnigateError::RemoteLogic`].
    pub fn into_result(self) -> Result<(), OmnigateError> {
        match self.error {
            None => Ok(()),
            Some(fault) => Err(OmnigateError::RemoteLogic {
                id: fault.id,
                detail: fault.detail,
            }),
        }
    }
}

/// Transport to a single, already selected engine instance.
///
/// Transport failures are `Err`; logical failures come back inside
/// [`EngineReply`].
#[async_trait]
pub trait EngineTransport: Send + Sync {
    async fn start(
        &self,
        target: &EngineInstance,
        request: StartRequest,
    ) -> Result<EngineReply, OmnigateError>;

    async fn break_flow(
        &self,
        target: &EngineInstance,
        request: BreakRequest,
    ) -> Result<EngineReply, OmnigateError>;

    async fn confirmation_message(
        &self,
        target: &EngineInstance,
        request: ConfirmationRequest,
    ) -> Result<EngineReply, OmnigateError>;
}

/// Service directory listing the live instances of a service.
#[async_trait]
pub trait InstanceDirectory: Send + Sync {
    async fn instances(&self, service: &str) -> Result<Vec<EngineInstance>, OmnigateError>;
}
