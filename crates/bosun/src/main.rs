//! Bosun - transactional configuration client for engine-managed load balancers

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;

use bosun_core::{ConfigCache, ConfigClient};
use bosun_engine::{ExecEngine, ExecEngineConfig};
use commands::Command;
use config::Config;

/// Bosun - transactional CRUD client for load-balancer configuration
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "bosun.toml")]
    config: String,

    /// Engine control binary (overrides the config file)
    #[arg(long, env = "BOSUN_ENGINE_BIN")]
    engine_bin: Option<String>,

    /// Disable the configuration cache for this invocation
    #[arg(long)]
    no_cache: bool,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load(&args.config)?;
    init_logging(&config.logging.level);

    let engine = Arc::new(ExecEngine::new(ExecEngineConfig {
        binary: PathBuf::from(args.engine_bin.unwrap_or(config.engine.binary)),
        config_file: PathBuf::from(config.engine.config_file),
        timeout_secs: config.engine.timeout_secs,
    }));

    let cache_enabled = config.cache.enabled && !args.no_cache;
    let client = ConfigClient::new(
        engine,
        ConfigCache::new(cache_enabled),
        config.client.validate,
    );

    commands::dispatch(&client, args.command).await
}

/// Initialize logging
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
