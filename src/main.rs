//! Voice Memos CLI entry point

use std::process::ExitCode;

use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use voice_memos::cli::{
    app::{load_merged_config, run_shell, EXIT_ERROR},
    args::{Cli, Commands},
    config_cmd::handle_config_command,
    presenter::Presenter,
};
use voice_memos::application::ports::ConfigStore;
use voice_memos::domain::config::AppConfig;
use voice_memos::infrastructure::XdgConfigStore;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let presenter = Presenter::new();
    let store = XdgConfigStore::new();

    if let Some(Commands::Config { action }) = cli.command {
        if let Err(e) = handle_config_command(action, &store, &presenter).await {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
        return ExitCode::SUCCESS;
    }

    let cli_config = cli.to_config();
    let (config, load_error) = match load_merged_config(&store, cli_config.clone()).await {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::defaults().merge(cli_config), Some(e)),
    };

    init_tracing(config.log_level_or_default());
    if let Some(e) = load_error {
        warn!(error = %e, path = %store.path().display(), "Ignoring config file");
        presenter.warn(&format!("Ignoring config file: {}", e));
    }

    run_shell(config).await
}

/// Diagnostics go to stderr. `RUST_LOG` wins over the configured level.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
