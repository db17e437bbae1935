pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::config::AppConfig;
use crate::providers::{CachingRateProvider, FallbackRateProvider, RatesOutcome};
use crate::store::memory::MemoryCache;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Rates { watch: bool, refresh: bool },
    History { currency: String },
    Convert { amount: f64, from: String, to: String },
}

/// Builds the Bank of China -> CIB -> seed chain behind a freshness cache.
pub fn rate_provider(config: &AppConfig) -> Result<CachingRateProvider> {
    let cache = Arc::new(MemoryCache::<String, RatesOutcome>::new());
    Ok(CachingRateProvider::new(
        FallbackRateProvider::from_config(config)?,
        cache,
        config.cache.freshness(),
    ))
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("fxboard starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let history = store::open_history_store(&config);

    match command {
        AppCommand::Rates { watch, refresh } => {
            let provider = rate_provider(&config)?;
            if watch {
                cli::rates::watch(&provider, history.as_ref(), config.poll_interval(), refresh).await
            } else {
                cli::rates::run(&provider, history.as_ref(), refresh).await
            }
        }
        AppCommand::History { currency } => cli::history::run(history.as_ref(), &currency).await,
        AppCommand::Convert { amount, from, to } => {
            let provider = rate_provider(&config)?;
            cli::convert::run(&provider, history.as_ref(), amount, &from, &to).await
        }
    }
}
