pub mod cli;
pub mod core;
pub mod providers;

use crate::core::config::AppConfig;
use crate::providers::ExchangeRateApiProvider;
use anyhow::Result;
use tracing::{debug, info};

pub enum AppCommand {
    Rates,
    Convert {
        amount: String,
        from: String,
        to: String,
    },
    Session,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("DiiFlip starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let provider = ExchangeRateApiProvider::new(&config.providers.exchange_rate)?;

    match command {
        AppCommand::Rates => cli::rates::run(&provider).await,
        AppCommand::Convert { amount, from, to } => {
            cli::convert::run(&config, &provider, &amount, &from, &to).await
        }
        AppCommand::Session => cli::session::run(&config, &provider).await,
    }
}
