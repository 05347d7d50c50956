// SPDX-FileCopyrightText: 2026 Omnigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;
use std::time::Duration;

use omnigate_adapter::FlowAdapterService;
use omnigate_cache::{ChatCache, MemoryStore};
use omnigate_config::model::AdapterConfig;
use omnigate_core::traits::engine::EngineInstance;
use omnigate_core::{ChannelType, ConnectorRegistry, ConversationId, Message, OmnigateError};
use omnigate_flow::{Delivery, FlowBridgeClient, FlowContext, FlowEngine, StaticDirectory};
use omnigate_test_utils::fixtures::{self, PROFILE};
use omnigate_test_utils::{MockConnector, MockEngine, MockStorage};

struct Setup {
    adapter: FlowAdapterService,
    cache: ChatCache,
    engine: Arc<MockEngine>,
    storage: Arc<MockStorage>,
    telegram: Arc<MockConnector>,
}

fn setup() -> Setup {
    let engine = Arc::new(MockEngine::new());
    let directory = StaticDirectory::with_service(
        "workflow",
        vec![EngineInstance {
            id: "engine-1".into(),
            address: "10.0.0.1:10021".into(),
        }],
    );
    let flow = FlowEngine::new(
        Arc::new(directory),
        engine.clone(),
        "workflow",
        Duration::from_secs(5),
    );
    let cache = ChatCache::new(Arc::new(MemoryStore::new()), Duration::from_secs(3600));
    let bridge = Arc::new(FlowBridgeClient::new(FlowContext::new(
        cache.clone(),
        Arc::new(flow),
    )));
    let storage = Arc::new(MockStorage::new());
    let telegram = Arc::new(MockConnector::new(ChannelType::Telegram));
    let connectors = ConnectorRegistry::new().with(telegram.clone());
    let adapter = FlowAdapterService::new(
        bridge,
        storage.clone(),
        connectors,
        AdapterConfig::default(),
    );
    Setup {
        adapter,
        cache,
        engine,
        storage,
        telegram,
    }
}

fn text(cid: &ConversationId, body: &str) -> Message {
    Message::text(cid.clone(), None, body)
}

async fn with_conversation(setup: &Setup, id: &str, channel_type: ChannelType) -> ConversationId {
    setup.storage.insert_conversation(fixtures::conversation(id)).await;
    setup
        .storage
        .insert_channel(fixtures::channel(&format!("{id}-ext"), id, channel_type, "customer"))
        .await;
    setup
        .storage
        .insert_channel(fixtures::channel(
            &format!("{id}-op"),
            id,
            ChannelType::Webitel,
            "operator",
        ))
        .await;
    ConversationId::from(id)
}

#[tokio::test]
async fn init_binds_conversation_to_an_engine() {
    let setup = setup();
    let cid = ConversationId::from("c1");
    setup.adapter.init(&cid, PROFILE, "1", text(&cid, "hello")).await;

    assert_eq!(setup.engine.starts().await.len(), 1);
    assert_eq!(
        setup.cache.read_conversation_node(&cid).await.unwrap().as_deref(),
        Some("engine-1")
    );
}

#[tokio::test]
async fn empty_wait_leaves_token_and_echoes_timeout() {
    let setup = setup();
    let cid = ConversationId::from("c1");

    let reply = setup.adapter.wait_message(&cid, "conf-1", 15).await.unwrap();
    assert!(reply.messages.is_empty());
    assert_eq!(reply.timeout_sec, 15);
    assert_eq!(
        setup.cache.read_confirmation(&cid).await.unwrap().as_deref(),
        Some("conf-1")
    );

    let reply = setup.adapter.wait_message(&cid, "conf-2", 0).await.unwrap();
    assert_eq!(reply.timeout_sec, 30);
    assert_eq!(
        setup.cache.read_confirmation(&cid).await.unwrap().as_deref(),
        Some("conf-2")
    );
}

#[tokio::test]
async fn wait_drains_buffer_immediately() {
    let setup = setup();
    let cid = ConversationId::from("c1");
    setup.adapter.init(&cid, PROFILE, "1", text(&cid, "hello")).await;

    let msg = text(&cid, "queued");
    let delivery = setup
        .adapter
        .send_message_to_flow(&cid, msg.clone())
        .await
        .unwrap();
    assert_eq!(delivery, Delivery::Buffered);

    let reply = setup.adapter.wait_message(&cid, "conf-1", 20).await.unwrap();
    assert_eq!(reply.messages, vec![msg]);
    assert_eq!(reply.timeout_sec, 0);
    assert!(setup.cache.read_cached_messages(&cid).await.unwrap().is_empty());
    assert!(setup.cache.read_confirmation(&cid).await.unwrap().is_none());
}

#[tokio::test]
async fn send_to_flow_after_wait_goes_through_confirmation() {
    let setup = setup();
    let cid = ConversationId::from("c1");
    setup.adapter.init(&cid, PROFILE, "1", text(&cid, "hello")).await;
    setup.adapter.wait_message(&cid, "conf-1", 10).await.unwrap();

    let delivery = setup
        .adapter
        .send_message_to_flow(&cid, text(&cid, "now"))
        .await
        .unwrap();
    assert_eq!(delivery, Delivery::Confirmed);
    assert_eq!(setup.engine.confirmations().await[0].1.confirmation_id, "conf-1");
    assert!(setup.cache.read_confirmation(&cid).await.unwrap().is_none());
}

#[tokio::test]
async fn engine_output_reaches_external_channel_and_storage() {
    let setup = setup();
    let cid = with_conversation(&setup, "c1", ChannelType::Telegram).await;

    setup
        .adapter
        .send_message(&cid, vec![text(&cid, "one"), text(&cid, "two")])
        .await
        .unwrap();

    let sent = setup.telegram.sent().await;
    assert_eq!(sent.len(), 2);
    assert!(sent.iter().all(|(channel, _)| channel.id.as_str() == "c1-ext"));
    assert_eq!(setup.storage.messages().await.len(), 2);
}

#[tokio::test]
async fn connector_failure_does_not_skip_persistence() {
    let setup = setup();
    let cid = with_conversation(&setup, "c1", ChannelType::Telegram).await;
    setup.telegram.set_failing(true);

    setup
        .adapter
        .send_message(&cid, vec![text(&cid, "lost in transit")])
        .await
        .unwrap();

    assert_eq!(setup.telegram.sent_count().await, 0);
    assert_eq!(setup.storage.messages().await.len(), 1);
}

#[tokio::test]
async fn unknown_channel_type_is_a_persisted_no_op() {
    let setup = setup();
    let cid = with_conversation(&setup, "c1", ChannelType::from("line")).await;

    setup
        .adapter
        .send_message(&cid, vec![text(&cid, "hi")])
        .await
        .unwrap();

    assert_eq!(setup.telegram.sent_count().await, 0);
    assert_eq!(setup.storage.messages().await.len(), 1);
}

#[tokio::test]
async fn output_for_unknown_conversation_is_not_found() {
    let setup = setup();
    let err = setup
        .adapter
        .send_message(&ConversationId::from("ghost"), vec![])
        .await
        .unwrap_err();
    assert!(matches!(err, OmnigateError::NotFound { kind: "conversation", .. }));
}

#[tokio::test]
async fn close_purges_cache_session_and_storage() {
    let setup = setup();
    let cid = with_conversation(&setup, "c1", ChannelType::Telegram).await;
    setup.adapter.init(&cid, PROFILE, "1", text(&cid, "hello")).await;
    setup.cache.write_session("session-c1", &cid).await.unwrap();
    setup
        .adapter
        .send_message_to_flow(&cid, text(&cid, "buffered"))
        .await
        .unwrap();

    setup.adapter.close_conversation(&cid).await.unwrap();

    assert!(setup.cache.read_conversation_node(&cid).await.unwrap().is_none());
    assert!(setup.cache.read_confirmation(&cid).await.unwrap().is_none());
    assert!(setup.cache.read_cached_messages(&cid).await.unwrap().is_empty());
    assert!(setup.cache.read_session("session-c1").await.unwrap().is_none());
    assert_eq!(setup.storage.close_calls().await.len(), 1);
    assert!(setup.storage.conversation(&cid).await.unwrap().is_closed());
}
