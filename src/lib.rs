pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod config_store;
pub mod error;
pub mod logging;
pub mod model_gateway;
pub mod normalize;
pub mod output;
pub mod providers;
pub mod request;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use std::io;
use tracing::info;

use cli::{Cli, Command};
use commands::{DialoguerPicker, SystemRunner};
use config::Settings;
use config_store::ConfigStore;
use providers::GeminiGateway;

fn open_config_store() -> Result<ConfigStore> {
    let store = ConfigStore::open_default().context("Cannot proceed without a config file")?;
    store
        .initialize_if_absent()
        .context("Cannot proceed without a config file")?;
    Ok(store)
}

pub async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let _log_guard = logging::init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let settings = Settings::from_env();
    info!(
        api_key_var = %settings.api_key_var,
        api_key_present = settings.api_key.is_some(),
        base_url = %settings.base_url,
        timeout_secs = settings.timeout_secs,
        "loaded runtime configuration"
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();

    // Commands that call the model check the credential before touching the
    // config file.
    match command {
        Command::Search(args) => {
            let gateway = GeminiGateway::new(&settings)?;
            let store = open_config_store()?;
            commands::search(&args, &store, &gateway, &mut out).await
        }
        Command::Image(args) => {
            let gateway = GeminiGateway::new(&settings)?;
            let store = open_config_store()?;
            commands::image(&args, &store, &gateway, &mut out).await
        }
        Command::Model => {
            let mut store = open_config_store()?;
            commands::change_model(&mut store, &DialoguerPicker, &mut out)
        }
        Command::Version => {
            open_config_store()?;
            commands::print_version(&mut out)
        }
        Command::Update => {
            open_config_store()?;
            commands::update(&SystemRunner, &mut out)
        }
    }
}
