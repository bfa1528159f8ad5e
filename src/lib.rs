pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::AllocationEngine;
use crate::core::config::AppConfig;
use anyhow::Result;
use tracing::{debug, info};

pub enum AppCommand {
    Allocate {
        amount: String,
        strategy: String,
        json: bool,
    },
    Strategies,
}

/// Wires the configured cache and provider stack into an engine.
pub fn build_engine(config: &AppConfig) -> Result<AllocationEngine> {
    let cache = store::open_price_cache(config);
    let provider = providers::build_provider(config, cache)?;
    Ok(AllocationEngine::new(provider).with_minimum_amount(config.minimum_amount))
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("stratfolio starting...");

    match command {
        AppCommand::Strategies => {
            cli::strategies::run();
            Ok(())
        }
        AppCommand::Allocate {
            amount,
            strategy,
            json,
        } => {
            let config = match config_path {
                Some(path) => AppConfig::load_from_path(path)?,
                None => AppConfig::load()?,
            };
            debug!("Loaded config: {config:#?}");

            let engine = build_engine(&config)?;
            cli::allocate::run(&engine, &amount, &strategy, json).await
        }
    }
}
