// SPDX-FileCopyrightText: 2026 Omnigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./omnigate.toml` > `~/.config/omnigate/omnigate.toml` >
//! `/etc/omnigate/omnigate.toml`, with environment variable overrides via `OMNIGATE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::OmnigateConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/omnigate/omnigate.toml`
/// 3. `~/.config/omnigate/omnigate.toml`
/// 4. `./omnigate.toml`
/// 5. `OMNIGATE_*` environment variables
pub fn load_config() -> Result<OmnigateConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<OmnigateConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(OmnigateConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<OmnigateConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(OmnigateConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(OmnigateConfig::default()))
        .merge(Toml::file("/etc/omnigate/omnigate.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("omnigate/omnigate.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("omnigate.toml"))
        .merge(env_provider())
}

/// Environment provider mapping `OMNIGATE_<SECTION>_<KEY>` to `<section>.<key>`.
///
/// Uses `Env::map()` rather than `Env::split("_")` because keys themselves
/// contain underscores: `OMNIGATE_FLOW_CALL_TIMEOUT_SECS` must become
/// `flow.call_timeout_secs`.
fn env_provider() -> Env {
    Env::prefixed("OMNIGATE_").map(|key| map_env_key(key.as_str()).into())
}

/// Maps a lowercased, prefix-stripped env var name to its dotted config path.
pub fn map_env_key(key: &str) -> String {
    const SECTIONS: [&str; 5] = ["log", "cache", "flow", "adapter", "router"];

    for section in SECTIONS {
        if let Some(rest) = key.strip_prefix(section)
            && let Some(field) = rest.strip_prefix('_')
        {
            return format!("{section}.{field}");
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_sections() {
        assert_eq!(map_env_key("cache_ttl_secs"), "cache.ttl_secs");
        assert_eq!(
            map_env_key("flow_call_timeout_secs"),
            "flow.call_timeout_secs"
        );
        assert_eq!(map_env_key("log_level"), "log.level");
        assert_eq!(map_env_key("unrelated"), "unrelated");
    }
}
