// SPDX-FileCopyrightText: 2026 Omnigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deadlines for collaborator calls.

use std::future::Future;
use std::time::Duration;

use crate::error::OmnigateError;

/// Runs `call`, failing with [`OmnigateError::Timeout`] once `limit` elapses.
pub async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, OmnigateError>
where
    F: Future<Output = Result<T, OmnigateError>>,
{
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| OmnigateError::Timeout { duration: limit })?
}
