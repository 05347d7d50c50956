// SPDX-FileCopyrightText: 2026 Omnigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Omnigate chat gateway.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level Omnigate configuration.
///
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OmnigateConfig {
    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,

    /// TTL cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Flow engine addressing and call settings.
    #[serde(default)]
    pub flow: FlowConfig,

    /// Flow adapter (engine-facing) settings.
    #[serde(default)]
    pub adapter: AdapterConfig,

    /// Event router settings.
    #[serde(default)]
    pub router: RouterConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Logging level (trace, debug, info, warn, error) or a full `EnvFilter` directive.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// TTL cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Expiry applied to every cache write, in seconds.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// How often the in-memory store sweeps expired entries, in seconds.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

fn default_ttl_secs() -> u64 {
    24 * 60 * 60
}

fn default_sweep_interval_secs() -> u64 {
    60
}

/// A statically configured flow engine instance.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct InstanceConfig {
    /// Instance identifier recorded as node affinity.
    pub id: String,
    /// Network address of the instance.
    pub address: String,
}

/// Flow engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FlowConfig {
    /// Service name looked up in the instance directory.
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Deadline for every Start / Break / ConfirmationMessage call, in seconds.
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,

    /// Static instance list used when no external directory is wired in.
    #[serde(default)]
    pub instances: Vec<InstanceConfig>,
}

impl FlowConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            call_timeout_secs: default_call_timeout_secs(),
            instances: Vec::new(),
        }
    }
}

fn default_service_name() -> String {
    "workflow".to_string()
}

fn default_call_timeout_secs() -> u64 {
    10
}

/// Flow adapter configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AdapterConfig {
    /// Poll timeout handed back to the engine when it asks for `0`.
    #[serde(default = "default_wait_timeout_secs")]
    pub default_wait_timeout_secs: u64,

    /// Deadline for connector and storage calls, in seconds.
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,
}

impl AdapterConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            default_wait_timeout_secs: default_wait_timeout_secs(),
            call_timeout_secs: default_call_timeout_secs(),
        }
    }
}

fn default_wait_timeout_secs() -> u64 {
    30
}

/// Event router configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RouterConfig {
    /// Deadline for each single recipient delivery, in seconds.
    #[serde(default = "default_call_timeout_secs")]
    pub delivery_timeout_secs: u64,

    /// Text handed to the flow when a participant leaves the conversation.
    #[serde(default = "default_leave_message")]
    pub leave_message: String,
}

impl RouterConfig {
    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_secs(self.delivery_timeout_secs)
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            delivery_timeout_secs: default_call_timeout_secs(),
            leave_message: default_leave_message(),
        }
    }
}

fn default_leave_message() -> String {
    "Leave conversation".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_bridge_contract() {
        let config = OmnigateConfig::default();
        assert_eq!(config.cache.ttl(), Duration::from_secs(86_400));
        assert_eq!(config.flow.service_name, "workflow");
        assert!(config.flow.instances.is_empty());
        assert_eq!(config.adapter.default_wait_timeout_secs, 30);
        assert_eq!(config.router.leave_message, "Leave conversation");
    }

    #[test]
    fn instances_deny_unknown_fields() {
        let toml_str = r#"
[[flow.instances]]
id = "engine-1"
address = "10.0.0.1:10021"
weight = 3
"#;
        assert!(toml::from_str::<OmnigateConfig>(toml_str).is_err());
    }
}
