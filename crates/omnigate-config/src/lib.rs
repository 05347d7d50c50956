// SPDX-FileCopyrightText: 2026 Omnigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Omnigate chat gateway.
//!
//! Provides TOML configuration parsing with strict validation (`deny_unknown_fields`),
//! XDG file hierarchy lookup, `OMNIGATE_*` environment variable overrides, and
//! miette diagnostics with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use omnigate_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("cache ttl: {:?}", config.cache.ttl());
//! ```

use std::path::{Path, PathBuf};

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::OmnigateConfig;

/// Load configuration from the lookup hierarchy and validate it.
pub fn load_and_validate() -> Result<OmnigateConfig, Vec<ConfigError>> {
    validated(loader::load_config(), hierarchy_sources)
}

/// Load configuration from an explicit file (plus env overrides) and validate it.
pub fn load_and_validate_path(path: &Path) -> Result<OmnigateConfig, Vec<ConfigError>> {
    validated(loader::load_config_from_path(path), || {
        read_source(path).into_iter().collect()
    })
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<OmnigateConfig, Vec<ConfigError>> {
    validated(loader::load_config_from_str(toml_content), || {
        vec![("<inline>".to_string(), toml_content.to_string())]
    })
}

/// Runs semantic validation on an extracted config, or turns the extraction
/// error into diagnostics against the sources `sources` reads.
fn validated(
    extracted: Result<OmnigateConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<(String, String)>,
) -> Result<OmnigateConfig, Vec<ConfigError>> {
    let config = extracted.map_err(|err| diagnostic::figment_to_config_errors(err, &sources()))?;
    validation::validate_config(&config)?;
    Ok(config)
}

fn read_source(path: &Path) -> Option<(String, String)> {
    let content = std::fs::read_to_string(path).ok()?;
    Some((path.display().to_string(), content))
}

/// Every hierarchy file that exists, for span resolution in diagnostics.
fn hierarchy_sources() -> Vec<(String, String)> {
    let local = std::env::current_dir()
        .map(|dir| dir.join("omnigate.toml"))
        .unwrap_or_else(|_| PathBuf::from("omnigate.toml"));
    let user = dirs::config_dir().map(|dir| dir.join("omnigate/omnigate.toml"));
    let system = PathBuf::from("/etc/omnigate/omnigate.toml");

    [Some(local), user, Some(system)]
        .into_iter()
        .flatten()
        .filter_map(|path| read_source(&path))
        .collect()
}
