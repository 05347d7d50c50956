// SPDX-FileCopyrightText: 2026 Omnigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock flow engine transport.
//!
//! Records every call together with the instance it was addressed to, so
//! tests can assert sticky targeting. Replies are `ok` unless a fault or a
//! transport error has been injected.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use omnigate_core::traits::engine::{
    BreakRequest, ConfirmationRequest, EngineFault, EngineInstance, EngineReply, StartRequest,
};
use omnigate_core::{EngineTransport, OmnigateError};

/// One recorded engine call.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Start {
        target: EngineInstance,
        request: StartRequest,
    },
    Break {
        target: EngineInstance,
        request: BreakRequest,
    },
    Confirmation {
        target: EngineInstance,
        request: ConfirmationRequest,
    },
}

impl EngineCall {
    pub fn target(&self) -> &EngineInstance {
        match self {
            EngineCall::Start { target, .. }
            | EngineCall::Break { target, .. }
            | EngineCall::Confirmation { target, .. } => target,
        }
    }
}

#[derive(Default)]
pub struct MockEngine {
    calls: Mutex<Vec<EngineCall>>,
    fault: Mutex<Option<EngineFault>>,
    transport_error: AtomicBool,
    delay: Option<Duration>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleeps for `delay` before answering each call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every following call answers with this logical fault (or `ok` for `None`).
    pub async fn set_fault(&self, fault: Option<EngineFault>) {
        *self.fault.lock().await = fault;
    }

    /// Every following call fails at the transport level.
    pub fn set_transport_error(&self, fail: bool) {
        self.transport_error.store(fail, Ordering::SeqCst);
    }

    pub async fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().await.clone()
    }

    pub async fn starts(&self) -> Vec<(EngineInstance, StartRequest)> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|c| match c {
                EngineCall::Start { target, request } => Some((target.clone(), request.clone())),
                _ => None,
            })
            .collect()
    }

    pub async fn breaks(&self) -> Vec<(EngineInstance, BreakRequest)> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|c| match c {
                EngineCall::Break { target, request } => Some((target.clone(), request.clone())),
                _ => None,
            })
            .collect()
    }

    pub async fn confirmations(&self) -> Vec<(EngineInstance, ConfirmationRequest)> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|c| match c {
                EngineCall::Confirmation { target, request } => {
                    Some((target.clone(), request.clone()))
                }
                _ => None,
            })
            .collect()
    }

    async fn answer(&self, call: EngineCall) -> Result<EngineReply, OmnigateError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let address = call.target().address.clone();
        self.calls.lock().await.push(call);
        if self.transport_error.load(Ordering::SeqCst) {
            return Err(OmnigateError::RemoteCall {
                service: address,
                source: "connection refused".into(),
            });
        }
        Ok(EngineReply {
            error: self.fault.lock().await.clone(),
        })
    }
}

#[async_trait]
impl EngineTransport for MockEngine {
    async fn start(
        &self,
        target: &EngineInstance,
        request: StartRequest,
    ) -> Result<EngineReply, OmnigateError> {
        self.answer(EngineCall::Start {
            target: target.clone(),
            request,
        })
        .await
    }

    async fn break_flow(
        &self,
        target: &EngineInstance,
        request: BreakRequest,
    ) -> Result<EngineReply, OmnigateError> {
        self.answer(EngineCall::Break {
            target: target.clone(),
            request,
        })
        .await
    }

    async fn confirmation_message(
        &self,
        target: &EngineInstance,
        request: ConfirmationRequest,
    ) -> Result<EngineReply, OmnigateError> {
        self.answer(EngineCall::Confirmation {
            target: target.clone(),
            request,
        })
        .await
    }
}
