// SPDX-FileCopyrightText: 2026 Omnigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The confirmation handshake between message producers and a polling engine.
//!
//! The engine never receives pushed messages. It polls, and a poll that finds
//! nothing leaves a confirmation token behind. A producer that sees the token
//! delivers through the engine's confirmation call; one that does not buffers
//! the message for the next poll. Token and buffer are written with guarded
//! writes so the two sides never leave both populated, as long as the store
//! implements [`omnigate_cache::KvStore::set_guarded`] atomically.

use std::sync::Arc;

use omnigate_cache::ChatCache;
use omnigate_core::traits::engine::ConfirmationRequest;
use omnigate_core::{ConversationId, Message, OmnigateError};
use tracing::{debug, warn};

use crate::engine::FlowEngine;

/// Rounds a producer or a poll retries when the other side wins a guarded write.
const MAX_ROUNDS: usize = 3;

/// Shared handles for the bridge, built once at startup.
#[derive(Clone)]
pub struct FlowContext {
    pub cache: ChatCache,
    pub engine: Arc<FlowEngine>,
}

impl FlowContext {
    pub fn new(cache: ChatCache, engine: Arc<FlowEngine>) -> Self {
        Self { cache, engine }
    }
}

/// How [`deliver`] handed the message over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Sent through the engine's confirmation call; the token was consumed.
    Confirmed,
    /// Buffered for the engine's next poll.
    Buffered,
    /// Could not be encoded for the buffer and was discarded.
    Dropped,
}

/// Hands one message to the conversation's flow.
pub async fn deliver(
    ctx: &FlowContext,
    conversation_id: &ConversationId,
    message: Message,
) -> Result<Delivery, OmnigateError> {
    for _ in 0..MAX_ROUNDS {
        if let Some(token) = ctx.cache.read_confirmation(conversation_id).await? {
            confirm(ctx, conversation_id, token, message).await?;
            return Ok(Delivery::Confirmed);
        }
        match ctx
            .cache
            .write_cached_message_unless_confirmed(conversation_id, &message)
            .await
        {
            Ok(true) => {
                debug!(
                    conversation_id = %conversation_id,
                    message_id = %message.id,
                    "message buffered for next poll"
                );
                return Ok(Delivery::Buffered);
            }
            // The engine started waiting in between: deliver through its token.
            Ok(false) => continue,
            Err(OmnigateError::Serialization(e)) => {
                warn!(
                    conversation_id = %conversation_id,
                    message_id = %message.id,
                    error = %e,
                    "dropping message that cannot be buffered"
                );
                return Ok(Delivery::Dropped);
            }
            Err(e) => return Err(e),
        }
    }
    Err(OmnigateError::Internal(format!(
        "confirmation token for conversation {conversation_id} kept changing during delivery"
    )))
}

async fn confirm(
    ctx: &FlowContext,
    conversation_id: &ConversationId,
    confirmation_id: String,
    message: Message,
) -> Result<(), OmnigateError> {
    let node = ctx
        .cache
        .read_conversation_node(conversation_id)
        .await?
        .ok_or_else(|| {
            OmnigateError::Routing(format!("conversation {conversation_id} has no engine node"))
        })?;
    ctx.engine
        .confirm(
            &node,
            ConfirmationRequest {
                conversation_id: conversation_id.clone(),
                confirmation_id: confirmation_id.clone(),
                messages: vec![message],
            },
        )
        .await?;
    // A poll that arrived during the call may have left a newer token.
    let consumed = ctx
        .cache
        .consume_confirmation(conversation_id, &confirmation_id)
        .await?;
    debug!(
        conversation_id = %conversation_id,
        node = %node,
        token_replaced = !consumed,
        "message confirmed to engine"
    );
    Ok(())
}

/// One engine poll: drains the buffer, or leaves `confirmation_id` behind
/// when there is nothing to return.
pub async fn poll(
    cache: &ChatCache,
    conversation_id: &ConversationId,
    confirmation_id: &str,
) -> Result<Vec<Message>, OmnigateError> {
    for _ in 0..MAX_ROUNDS {
        let messages = cache.read_cached_messages(conversation_id).await?;
        if !messages.is_empty() {
            for message in &messages {
                cache.delete_cached_message(conversation_id, &message.id).await?;
            }
            cache.delete_confirmation(conversation_id).await?;
            debug!(
                conversation_id = %conversation_id,
                count = messages.len(),
                "buffered messages handed to engine"
            );
            return Ok(messages);
        }
        if cache
            .write_confirmation_unless_buffered(conversation_id, confirmation_id)
            .await?
        {
            return Ok(Vec::new());
        }
        // A producer buffered a message in between: drain it.
    }
    Err(OmnigateError::Internal(format!(
        "buffer for conversation {conversation_id} kept changing during poll"
    )))
}
