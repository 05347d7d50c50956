// SPDX-FileCopyrightText: 2026 Omnigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation event fan-out.
//!
//! Every event starts on one channel. The router looks up the other open
//! channels of the conversation and delivers to each: operator consoles get a
//! notification on their per-user topic, bot channels get a message through
//! their connector. Delivery is best effort: one failed recipient is logged
//! and counted, the others still get the event.
//!
//! Recipient deliveries run under the router's own deadline. Flow bridge
//! calls do not: the bridge bounds its engine calls itself, and cutting it
//! off between the engine call and its cache update would leave stale state.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use omnigate_bus::{
    CloseEvent, ConversationEvent, DeclineEvent, InviteEvent, JoinEvent, LeaveEvent, MessageEvent,
    topic,
};
use omnigate_config::model::RouterConfig;
use omnigate_core::deadline::bounded;
use omnigate_core::{
    Channel, ChannelFilter, ChannelType, ConnectorRegistry, ConversationId, EventKind, FlowBridge,
    Message, NotificationPublisher, OmnigateError, StorageAdapter,
};
use tracing::{debug, warn};

/// Outcome of one routed event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanoutReport {
    pub delivered: usize,
    pub failed: usize,
    /// The event was handed to the flow bridge.
    pub forwarded_to_flow: bool,
}

impl FanoutReport {
    fn record(&mut self, outcome: Result<(), OmnigateError>) {
        match outcome {
            Ok(()) => self.delivered += 1,
            Err(_) => self.failed += 1,
        }
    }
}

enum Target<'a> {
    /// Operator console, notified on its per-user topic.
    Console,
    /// Bot channel, sent this message through its connector.
    Bot(&'a Message),
}

pub struct EventRouter {
    storage: Arc<dyn StorageAdapter>,
    connectors: ConnectorRegistry,
    publisher: Arc<dyn NotificationPublisher>,
    flow: Arc<dyn FlowBridge>,
    config: RouterConfig,
}

impl EventRouter {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        connectors: ConnectorRegistry,
        publisher: Arc<dyn NotificationPublisher>,
        flow: Arc<dyn FlowBridge>,
        config: RouterConfig,
    ) -> Self {
        Self {
            storage,
            connectors,
            publisher,
            flow,
            config,
        }
    }

    fn timeout(&self) -> Duration {
        self.config.delivery_timeout()
    }

    /// A message sent on `from`.
    ///
    /// With nobody else on the conversation, a message from an external
    /// channel goes to the flow; a flow failure is returned.
    pub async fn route_message(
        &self,
        from: &Channel,
        message: &Message,
    ) -> Result<FanoutReport, OmnigateError> {
        let recipients = self.others(from).await?;
        if recipients.is_empty() {
            return self.escalate_message(from, message).await;
        }
        let event = ConversationEvent::Message(MessageEvent::new(&from.id, message));
        Ok(self.fan_out(&recipients, &event, Some(message)).await)
    }

    /// `from` closes the conversation. Bot channels receive `cause` as text.
    pub async fn route_close(
        &self,
        from: &Channel,
        cause: &str,
    ) -> Result<FanoutReport, OmnigateError> {
        let recipients = self.others(from).await?;
        if recipients.is_empty() {
            if from.internal {
                return Ok(FanoutReport::default());
            }
            self.flow.close_conversation(&from.conversation_id).await?;
            return Ok(FanoutReport {
                forwarded_to_flow: true,
                ..FanoutReport::default()
            });
        }
        let event = ConversationEvent::Close(CloseEvent {
            conversation_id: from.conversation_id.clone(),
            from_channel_id: from.id.clone(),
            cause: cause.to_string(),
        });
        let notice = Message::text(from.conversation_id.clone(), Some(from.id.clone()), cause);
        Ok(self.fan_out(&recipients, &event, Some(&notice)).await)
    }

    /// `joined` was added to its conversation.
    pub async fn route_join(&self, joined: &Channel) -> Result<FanoutReport, OmnigateError> {
        let recipients = self.operators(joined).await?;
        let event = ConversationEvent::Join(JoinEvent {
            conversation_id: joined.conversation_id.clone(),
            joined_channel_id: joined.id.clone(),
        });
        Ok(self.fan_out(&recipients, &event, None).await)
    }

    /// `left` was removed from its conversation. The flow always learns about
    /// it, whoever else is still attached.
    pub async fn route_leave(&self, left: &Channel) -> Result<FanoutReport, OmnigateError> {
        let recipients = self.operators(left).await?;
        let event = ConversationEvent::Leave(LeaveEvent {
            conversation_id: left.conversation_id.clone(),
            leaved_channel_id: left.id.clone(),
        });
        let mut report = self.fan_out(&recipients, &event, None).await;

        let notice = Message::text(
            left.conversation_id.clone(),
            Some(left.id.clone()),
            self.config.leave_message.clone(),
        );
        match self.flow.send_message(&left.conversation_id, notice).await {
            Ok(()) => report.forwarded_to_flow = true,
            Err(e) => {
                warn!(
                    conversation_id = %left.conversation_id,
                    channel_id = %left.id,
                    error = %e,
                    "failed to notify flow about leave"
                );
                report.failed += 1;
            }
        }
        Ok(report)
    }

    /// `from` invites operator `user_id`. Besides the console fan-out, the
    /// invited operator gets the invitation on their own topic.
    pub async fn route_invite(
        &self,
        from: &Channel,
        invite_id: &str,
        user_id: &str,
    ) -> Result<FanoutReport, OmnigateError> {
        let recipients = self.operators(from).await?;
        let event = ConversationEvent::Invite(InviteEvent {
            conversation_id: from.conversation_id.clone(),
            invite_id: invite_id.to_string(),
            user_id: user_id.to_string(),
        });
        let mut report = self.fan_out(&recipients, &event, None).await;

        let direct = topic(EventKind::InviteConversation, &from.domain_id, user_id);
        let outcome = self.publish(&direct, &event).await;
        if let Err(ref e) = outcome {
            warn!(
                conversation_id = %from.conversation_id,
                user_id,
                error = %e,
                "failed to deliver invitation"
            );
        }
        report.record(outcome);
        Ok(report)
    }

    /// Operator `user_id` declined invitation `invite_id`.
    pub async fn route_decline(
        &self,
        conversation_id: &ConversationId,
        invite_id: &str,
        user_id: &str,
    ) -> Result<FanoutReport, OmnigateError> {
        let filter = ChannelFilter::conversation(conversation_id);
        let recipients = self.open_channels(&filter).await?;
        let recipients: Vec<Channel> = recipients
            .into_iter()
            .filter(|c| c.channel_type == ChannelType::Webitel)
            .collect();
        let event = ConversationEvent::Decline(DeclineEvent {
            conversation_id: conversation_id.clone(),
            invite_id: invite_id.to_string(),
            user_id: user_id.to_string(),
        });
        Ok(self.fan_out(&recipients, &event, None).await)
    }

    async fn escalate_message(
        &self,
        from: &Channel,
        message: &Message,
    ) -> Result<FanoutReport, OmnigateError> {
        if from.internal {
            debug!(
                conversation_id = %from.conversation_id,
                channel_id = %from.id,
                "operator message with no other participant"
            );
            return Ok(FanoutReport::default());
        }
        self.flow
            .send_message(&from.conversation_id, message.clone())
            .await?;
        Ok(FanoutReport {
            forwarded_to_flow: true,
            ..FanoutReport::default()
        })
    }

    async fn open_channels(&self, filter: &ChannelFilter) -> Result<Vec<Channel>, OmnigateError> {
        bounded(self.timeout(), self.storage.get_channels(filter)).await
    }

    /// Open channels of the conversation other than `from`.
    async fn others(&self, from: &Channel) -> Result<Vec<Channel>, OmnigateError> {
        let filter = ChannelFilter::conversation(&from.conversation_id).except(&from.id);
        self.open_channels(&filter).await
    }

    /// Operator console channels of the conversation other than `from`.
    async fn operators(&self, from: &Channel) -> Result<Vec<Channel>, OmnigateError> {
        Ok(self
            .others(from)
            .await?
            .into_iter()
            .filter(|c| c.channel_type == ChannelType::Webitel)
            .collect())
    }

    async fn fan_out(
        &self,
        recipients: &[Channel],
        event: &ConversationEvent,
        bot_message: Option<&Message>,
    ) -> FanoutReport {
        let deliveries = recipients.iter().filter_map(|recipient| {
            let target = match (recipient.channel_type == ChannelType::Webitel, bot_message) {
                (true, _) => Target::Console,
                (false, Some(message)) => Target::Bot(message),
                // Console-only event.
                (false, None) => return None,
            };
            Some(async move {
                let outcome = match target {
                    Target::Console => {
                        let topic = event.topic_for(&recipient.domain_id, &recipient.user_id);
                        self.publish(&topic, event).await
                    }
                    Target::Bot(message) => self.send(recipient, message).await,
                };
                if let Err(ref e) = outcome {
                    warn!(
                        conversation_id = %recipient.conversation_id,
                        channel_id = %recipient.id,
                        channel_type = %recipient.channel_type,
                        event = %event.kind(),
                        error = %e,
                        "delivery failed"
                    );
                }
                outcome
            })
        });

        let mut report = FanoutReport::default();
        for outcome in join_all(deliveries).await {
            report.record(outcome);
        }
        debug!(
            conversation_id = %event.conversation_id(),
            event = %event.kind(),
            delivered = report.delivered,
            failed = report.failed,
            "event routed"
        );
        report
    }

    async fn publish(&self, topic: &str, event: &ConversationEvent) -> Result<(), OmnigateError> {
        let payload = event.to_json()?;
        bounded(self.timeout(), self.publisher.publish(topic, payload)).await
    }

    async fn send(&self, recipient: &Channel, message: &Message) -> Result<(), OmnigateError> {
        let connector =
            self.connectors
                .get(&recipient.channel_type)
                .ok_or_else(|| OmnigateError::Connector {
                    channel_type: recipient.channel_type.to_string(),
                    message: "no connector registered".to_string(),
                })?;
        bounded(self.timeout(), connector.send_message(recipient, message)).await
    }
}

#[cfg(test)]
mod tests {
    use omnigate_test_utils::{MockConnector, MockFlowBridge, MockStorage, RecordingPublisher, fixtures};
    use tracing_test::traced_test;

    use super::*;

    #[tokio::test]
    #[traced_test]
    async fn failed_recipient_is_logged() {
        let storage = Arc::new(MockStorage::new());
        let operator = fixtures::channel("1", "c1", ChannelType::Webitel, "10");
        storage.insert_channel(operator.clone()).await;
        storage
            .insert_channel(fixtures::channel("2", "c1", ChannelType::Telegram, "customer"))
            .await;
        let router = EventRouter::new(
            storage,
            ConnectorRegistry::new().with(Arc::new(MockConnector::failing(ChannelType::Telegram))),
            Arc::new(RecordingPublisher::new()),
            Arc::new(MockFlowBridge::new()),
            RouterConfig::default(),
        );
        let message = Message::text(operator.conversation_id.clone(), Some(operator.id.clone()), "hi");

        let report = router.route_message(&operator, &message).await.unwrap();

        assert_eq!(report.failed, 1);
        assert!(logs_contain("delivery failed"));
        assert!(logs_contain("channel_type=telegram"));
    }

    #[test]
    fn report_counts_outcomes() {
        let mut report = FanoutReport::default();
        report.record(Ok(()));
        report.record(Err(OmnigateError::storage("down")));
        report.record(Ok(()));
        assert_eq!(report.delivered, 2);
        assert_eq!(report.failed, 1);
    }
}
