// SPDX-FileCopyrightText: 2026 Omnigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Omnigate - omni-channel chat gateway.
//!
//! Binary entry point. Loads and validates the layered configuration and
//! starts the config-derived parts of the gateway.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use omnigate::runtime;
use omnigate_config::{ConfigError, OmnigateConfig};

#[derive(Parser, Debug)]
#[command(name = "omnigate", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate and print the effective configuration.
    Config {
        /// Read this file instead of the standard lookup hierarchy.
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Start the cache and instance directory from configuration and report them.
    Check {
        /// Read this file instead of the standard lookup hierarchy.
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

fn load(path: Option<&PathBuf>) -> Result<OmnigateConfig, Vec<ConfigError>> {
    match path {
        Some(path) => omnigate_config::load_and_validate_path(path),
        None => omnigate_config::load_and_validate(),
    }
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    // A full directive is taken as-is; a bare level applies to omnigate crates only.
    let directive = if log_level.contains(['=', ',']) {
        log_level.to_string()
    } else {
        format!("omnigate={log_level},warn")
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

fn load_or_exit(path: Option<&PathBuf>) -> OmnigateConfig {
    match load(path) {
        Ok(config) => config,
        Err(errors) => {
            omnigate_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Config { path }) => run_config(load_or_exit(path.as_ref())),
        Some(Commands::Check { path }) => run_check(load_or_exit(path.as_ref())).await,
        None => println!("omnigate: use --help for available commands"),
    }
}

async fn run_check(config: OmnigateConfig) {
    init_tracing(&config.log.level);
    match runtime::check(&config).await {
        Ok(report) => {
            println!("flow service: {}", report.flow_service);
            if report.instances.is_empty() {
                println!("flow instances: none");
            } else {
                println!("flow instances: {}", report.instances.join(", "));
            }
            println!(
                "cache: ttl {}s, sweep every {}s, sweeper {}",
                config.cache.ttl_secs,
                config.cache.sweep_interval_secs,
                if report.sweeper_running { "running" } else { "stopped" }
            );
        }
        Err(e) => {
            eprintln!("omnigate: startup check failed: {e}");
            std::process::exit(1);
        }
    }
}

fn run_config(config: OmnigateConfig) {
    init_tracing(&config.log.level);
    tracing::info!(
        cache_ttl_secs = config.cache.ttl_secs,
        flow_service = %config.flow.service_name,
        flow_instances = config.flow.instances.len(),
        "configuration valid"
    );

    match toml::to_string_pretty(&config) {
        Ok(rendered) => print!("{rendered}"),
        Err(e) => {
            eprintln!("omnigate: failed to render configuration: {e}");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_config_path() {
        let cli = Cli::parse_from(["omnigate", "config", "--path", "/tmp/omnigate.toml"]);
        let Some(Commands::Config { path }) = cli.command else {
            panic!("expected config subcommand");
        };
        assert_eq!(path, Some(PathBuf::from("/tmp/omnigate.toml")));
    }

    #[test]
    fn cli_parses_check() {
        let cli = Cli::parse_from(["omnigate", "check"]);
        assert!(matches!(cli.command, Some(Commands::Check { path: None })));
    }

    #[test]
    fn default_config_renders_as_toml() {
        let config = omnigate_config::load_and_validate_str("")
            .expect("default config should be valid");
        let rendered = toml::to_string_pretty(&config).unwrap();
        assert!(rendered.contains("[cache]"));
        assert!(rendered.contains("service_name = \"workflow\""));
    }
}
