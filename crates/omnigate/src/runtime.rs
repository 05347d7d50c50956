// SPDX-FileCopyrightText: 2026 Omnigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Startup assembly.
//!
//! Builds the cache, flow bridge, flow adapter, event router and inbound
//! gateway from an [`OmnigateConfig`], and keeps the cache sweeper running
//! for as long as the assembled [`Runtime`] lives. Storage, the engine
//! transport and the platform connectors come from the deployment.

use std::sync::Arc;

use omnigate_adapter::FlowAdapterService;
use omnigate_bus::BroadcastBus;
use omnigate_cache::{ChatCache, MemoryStore};
use omnigate_config::OmnigateConfig;
use omnigate_core::{
    ConnectorRegistry, EngineTransport, InstanceDirectory, OmnigateError, StorageAdapter,
};
use omnigate_flow::{FlowBridgeClient, FlowContext, FlowEngine, StaticDirectory};
use omnigate_router::{EventRouter, InboundGateway};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Notifications kept for a subscriber that falls behind.
const BUS_CAPACITY: usize = 1024;

/// Deployment-provided parts the gateway talks to.
pub struct Collaborators {
    pub storage: Arc<dyn StorageAdapter>,
    pub transport: Arc<dyn EngineTransport>,
    pub connectors: ConnectorRegistry,
    /// Live instance directory. The `[[flow.instances]]` list is used when `None`.
    pub directory: Option<Arc<dyn InstanceDirectory>>,
}

/// The shared expiring store and its sweeper task.
struct CacheLayer {
    store: Arc<MemoryStore>,
    cache: ChatCache,
    sweeper: JoinHandle<()>,
}

impl CacheLayer {
    fn start(config: &OmnigateConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let sweeper = store.spawn_sweeper(config.cache.sweep_interval());
        let cache = ChatCache::from_config(store.clone(), &config.cache);
        Self {
            store,
            cache,
            sweeper,
        }
    }
}

/// Every gateway component, wired together.
pub struct Runtime {
    pub store: Arc<MemoryStore>,
    pub cache: ChatCache,
    pub bus: Arc<BroadcastBus>,
    pub bridge: Arc<FlowBridgeClient>,
    pub adapter: Arc<FlowAdapterService>,
    pub router: Arc<EventRouter>,
    pub gateway: Arc<InboundGateway>,
    sweeper: JoinHandle<()>,
}

impl Runtime {
    /// Builds every component from `config`. Must be called inside a tokio
    /// runtime: the cache sweeper is spawned here.
    pub fn assemble(config: &OmnigateConfig, collaborators: Collaborators) -> Self {
        let Collaborators {
            storage,
            transport,
            connectors,
            directory,
        } = collaborators;

        let CacheLayer {
            store,
            cache,
            sweeper,
        } = CacheLayer::start(config);

        let directory: Arc<dyn InstanceDirectory> = match directory {
            Some(directory) => directory,
            None => Arc::new(StaticDirectory::from_config(&config.flow)),
        };
        let engine = Arc::new(FlowEngine::from_config(directory, transport, &config.flow));
        let bridge = Arc::new(FlowBridgeClient::new(FlowContext::new(
            cache.clone(),
            engine,
        )));

        let adapter = Arc::new(FlowAdapterService::new(
            bridge.clone(),
            storage.clone(),
            connectors.clone(),
            config.adapter.clone(),
        ));

        let bus = Arc::new(BroadcastBus::new(BUS_CAPACITY));
        let router = Arc::new(EventRouter::new(
            storage.clone(),
            connectors.clone(),
            bus.clone(),
            bridge.clone(),
            config.router.clone(),
        ));
        let gateway = Arc::new(InboundGateway::new(
            storage,
            cache.clone(),
            bridge.clone(),
            router.clone(),
            config.adapter.call_timeout(),
        ));

        info!(
            connectors = connectors.len(),
            flow_service = %config.flow.service_name,
            cache_ttl_secs = config.cache.ttl_secs,
            "gateway assembled"
        );

        Self {
            store,
            cache,
            bus,
            bridge,
            adapter,
            router,
            gateway,
            sweeper,
        }
    }

    pub fn sweeper_running(&self) -> bool {
        !self.sweeper.is_finished()
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        self.sweeper.abort();
    }
}

/// What `omnigate check` found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub flow_service: String,
    /// Instance ids the directory lists for the flow service.
    pub instances: Vec<String>,
    pub sweeper_running: bool,
}

/// Starts the config-derived parts (the cache with its sweeper and the
/// configured instance directory) and reports what they resolved to.
pub async fn check(config: &OmnigateConfig) -> Result<CheckReport, OmnigateError> {
    let layer = CacheLayer::start(config);
    let directory = StaticDirectory::from_config(&config.flow);
    let instances: Vec<String> = directory
        .instances(&config.flow.service_name)
        .await?
        .into_iter()
        .map(|instance| instance.id)
        .collect();
    if instances.is_empty() {
        warn!(
            flow_service = %config.flow.service_name,
            "no flow instances configured; new conversations will run without a flow"
        );
    }

    let report = CheckReport {
        flow_service: config.flow.service_name.clone(),
        instances,
        sweeper_running: !layer.sweeper.is_finished(),
    };
    layer.sweeper.abort();
    info!(
        entries = layer.store.len().await,
        instances = report.instances.len(),
        "startup check complete"
    );
    Ok(report)
}
