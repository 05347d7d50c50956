// SPDX-FileCopyrightText: 2026 Omnigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Statically configured instance directory.

use std::collections::HashMap;

use async_trait::async_trait;
use omnigate_config::model::FlowConfig;
use omnigate_core::traits::engine::EngineInstance;
use omnigate_core::{InstanceDirectory, OmnigateError};
use tokio::sync::RwLock;

/// An [`InstanceDirectory`] whose instance lists are set in code or config.
///
/// Lists can be replaced at runtime, which is how a registry watcher (or a
/// test) removes an instance that went away.
#[derive(Debug, Default)]
pub struct StaticDirectory {
    services: RwLock<HashMap<String, Vec<EngineInstance>>>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_service(service: &str, instances: Vec<EngineInstance>) -> Self {
        let mut services = HashMap::new();
        services.insert(service.to_string(), instances);
        Self {
            services: RwLock::new(services),
        }
    }

    /// Directory holding the `[[flow.instances]]` list under `flow.service_name`.
    pub fn from_config(config: &FlowConfig) -> Self {
        let instances = config
            .instances
            .iter()
            .map(|i| EngineInstance {
                id: i.id.clone(),
                address: i.address.clone(),
            })
            .collect();
        Self::with_service(&config.service_name, instances)
    }

    pub async fn set_instances(&self, service: &str, instances: Vec<EngineInstance>) {
        self.services
            .write()
            .await
            .insert(service.to_string(), instances);
    }

    /// Deregisters one instance from every service.
    pub async fn remove_instance(&self, id: &str) {
        for instances in self.services.write().await.values_mut() {
            instances.retain(|i| i.id != id);
        }
    }
}

#[async_trait]
impl InstanceDirectory for StaticDirectory {
    async fn instances(&self, service: &str) -> Result<Vec<EngineInstance>, OmnigateError> {
        Ok(self
            .services
            .read()
            .await
            .get(service)
            .cloned()
            .unwrap_or_default())
    }
}
