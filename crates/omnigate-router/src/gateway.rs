// SPDX-FileCopyrightText: 2026 Omnigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ingestion of messages arriving from external senders.

use std::sync::Arc;
use std::time::Duration;

use omnigate_cache::ChatCache;
use omnigate_core::deadline::bounded;
use omnigate_core::{
    Channel, ChannelFilter, ChannelId, Conversation, ConversationId, ExternalSession, FlowBridge,
    Message, OmnigateError, StorageAdapter,
};
use tracing::{debug, info};

use crate::router::{EventRouter, FanoutReport};

/// What happened to one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutcome {
    pub conversation_id: ConversationId,
    pub channel_id: ChannelId,
    /// A new conversation was opened and its flow started with this message.
    pub conversation_created: bool,
    /// The sender's channel was created for this message.
    pub channel_attached: bool,
    /// Routing result; `None` when the message started a new conversation.
    pub report: Option<FanoutReport>,
}

/// Resolves external senders to conversations and routes their messages.
pub struct InboundGateway {
    storage: Arc<dyn StorageAdapter>,
    cache: ChatCache,
    flow: Arc<dyn FlowBridge>,
    router: Arc<EventRouter>,
    timeout: Duration,
}

impl InboundGateway {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        cache: ChatCache,
        flow: Arc<dyn FlowBridge>,
        router: Arc<EventRouter>,
        timeout: Duration,
    ) -> Self {
        Self {
            storage,
            cache,
            flow,
            router,
            timeout,
        }
    }

    /// Ingests one message from an external sender.
    ///
    /// A session index entry that points at an open conversation is always
    /// followed, whoever the sender is: a sender new to that conversation gets
    /// a channel attached to it. A new conversation is opened only when the
    /// index has no entry or its conversation is gone or closed.
    pub async fn process_message(
        &self,
        session: &ExternalSession,
        text: &str,
    ) -> Result<ProcessOutcome, OmnigateError> {
        if let Some(conversation) = self.indexed_conversation(session).await? {
            let (channel, attached) = self.sender_channel(&conversation, session).await?;
            if attached {
                self.router.route_join(&channel).await?;
            }
            let message = Message::text(
                channel.conversation_id.clone(),
                Some(channel.id.clone()),
                text,
            );
            bounded(self.timeout, self.storage.create_message(&message)).await?;
            let report = self.router.route_message(&channel, &message).await?;
            return Ok(ProcessOutcome {
                conversation_id: channel.conversation_id,
                channel_id: channel.id,
                conversation_created: false,
                channel_attached: attached,
                report: Some(report),
            });
        }

        let (conversation, channel) = self.open(session).await?;
        let message = Message::text(conversation.id.clone(), Some(channel.id.clone()), text);
        bounded(self.timeout, self.storage.create_message(&message)).await?;
        self.flow
            .start(
                &conversation.id,
                &conversation.profile_id,
                &conversation.domain_id,
                message,
            )
            .await;
        Ok(ProcessOutcome {
            conversation_id: conversation.id,
            channel_id: channel.id,
            conversation_created: true,
            channel_attached: true,
            report: None,
        })
    }

    /// The open conversation the session index points at, if any.
    async fn indexed_conversation(
        &self,
        session: &ExternalSession,
    ) -> Result<Option<Conversation>, OmnigateError> {
        let Some(conversation_id) = self.cache.read_session(&session.session_id).await? else {
            return Ok(None);
        };
        let conversation =
            bounded(self.timeout, self.storage.get_conversation_by_id(&conversation_id)).await?;
        match conversation {
            Some(conversation) if !conversation.is_closed() => Ok(Some(conversation)),
            _ => {
                debug!(
                    conversation_id = %conversation_id,
                    session_id = %session.session_id,
                    "stale session index entry"
                );
                Ok(None)
            }
        }
    }

    /// The sender's external channel on `conversation`, attaching a new one
    /// when the sender has none yet. The flag is `true` for a new channel.
    async fn sender_channel(
        &self,
        conversation: &Conversation,
        session: &ExternalSession,
    ) -> Result<(Channel, bool), OmnigateError> {
        let filter = ChannelFilter {
            user_id: Some(session.user_id.clone()),
            ..ChannelFilter::conversation(&conversation.id)
                .internal(false)
                .connection(&session.profile_id)
        };
        let channels = bounded(self.timeout, self.storage.get_channels(&filter)).await?;
        if let Some(channel) = channels.into_iter().next() {
            return Ok((channel, false));
        }

        let channel = external_channel(&conversation.id, session);
        bounded(self.timeout, self.storage.create_channel(&channel)).await?;
        info!(
            conversation_id = %conversation.id,
            channel_id = %channel.id,
            user_id = %session.user_id,
            "sender attached to open conversation"
        );
        Ok((channel, true))
    }

    async fn open(
        &self,
        session: &ExternalSession,
    ) -> Result<(Conversation, Channel), OmnigateError> {
        let conversation = Conversation::open(
            &session.profile_id,
            &session.domain_id,
            &session.session_id,
        );
        let channel = external_channel(&conversation.id, session);
        let client = bounded(self.timeout, self.storage.get_client_by_id(&session.user_id)).await?;
        bounded(self.timeout, self.storage.create_conversation(&conversation)).await?;
        bounded(self.timeout, self.storage.create_channel(&channel)).await?;
        self.cache
            .write_session(&session.session_id, &conversation.id)
            .await?;
        info!(
            conversation_id = %conversation.id,
            channel_type = %session.channel_type,
            profile_id = %session.profile_id,
            known_client = client.is_some(),
            "conversation opened"
        );
        Ok((conversation, channel))
    }
}

fn external_channel(conversation_id: &ConversationId, session: &ExternalSession) -> Channel {
    Channel {
        id: ChannelId::generate(),
        conversation_id: conversation_id.clone(),
        channel_type: session.channel_type.clone(),
        internal: false,
        connection: session.profile_id.clone(),
        user_id: session.user_id.clone(),
        domain_id: session.domain_id.clone(),
        closed_at: None,
    }
}
