// SPDX-FileCopyrightText: 2026 Omnigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::OmnigateConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &OmnigateConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    // A bare level must be one we know; anything with `=` or `,` is an EnvFilter directive.
    let level = config.log.level.trim();
    if level.is_empty() {
        errors.push(ConfigError::validation("log.level must not be empty"));
    } else if !level.contains(['=', ',']) && !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
        errors.push(ConfigError::validation(format!(
            "log.level `{level}` is not one of {}",
            LOG_LEVELS.join(", ")
        )));
    }

    if config.cache.ttl_secs == 0 {
        errors.push(ConfigError::validation(
            "cache.ttl_secs must be greater than zero",
        ));
    }

    if config.cache.sweep_interval_secs == 0 {
        errors.push(ConfigError::validation(
            "cache.sweep_interval_secs must be greater than zero",
        ));
    }

    if config.flow.service_name.trim().is_empty() {
        errors.push(ConfigError::validation(
            "flow.service_name must not be empty",
        ));
    }

    for (key, value) in [
        ("flow.call_timeout_secs", config.flow.call_timeout_secs),
        ("adapter.call_timeout_secs", config.adapter.call_timeout_secs),
        ("router.delivery_timeout_secs", config.router.delivery_timeout_secs),
    ] {
        if value == 0 {
            errors.push(ConfigError::validation(format!(
                "{key} must be greater than zero"
            )));
        }
    }

    let mut seen = HashSet::new();
    for instance in &config.flow.instances {
        if instance.id.trim().is_empty() {
            errors.push(ConfigError::validation(
                "flow.instances entries must have a non-empty id",
            ));
        } else if !seen.insert(instance.id.as_str()) {
            errors.push(ConfigError::validation(format!(
                "duplicate flow instance id `{}`",
                instance.id
            )));
        }
        if instance.address.trim().is_empty() {
            errors.push(ConfigError::validation(format!(
                "flow instance `{}` has an empty address",
                instance.id
            )));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::InstanceConfig;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_config(&OmnigateConfig::default()).is_ok());
    }

    #[test]
    fn env_filter_directive_is_accepted() {
        let mut config = OmnigateConfig::default();
        config.log.level = "info,omnigate_flow=debug".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn collects_all_errors() {
        let mut config = OmnigateConfig::default();
        config.log.level = "loud".to_string();
        config.cache.ttl_secs = 0;
        config.flow.service_name = " ".to_string();
        config.router.delivery_timeout_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn duplicate_instance_ids_fail_validation() {
        let mut config = OmnigateConfig::default();
        let instance = InstanceConfig {
            id: "engine-1".to_string(),
            address: "10.0.0.1:10021".to_string(),
        };
        config.flow.instances = vec![instance.clone(), instance];

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("duplicate flow instance id"))
        ));
    }
}
