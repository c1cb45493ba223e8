//! recym-cache - offline resource cache manager
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use recym_cache::cli::{Cli, Commands};
use recym_cache::config::{Config, ConfigManager};
use recym_cache::error::RecymResult;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> RecymResult<()> {
    let cli = Cli::parse();

    let config_manager = ConfigManager::resolve(cli.config.clone());

    let config = config_manager.load().await?;
    init_logging(cli.verbose, &config);
    debug!("Loaded configuration from {}", config_manager.path().display());

    // Config command never touches the partition store
    if let Commands::Config(args) = cli.command {
        return recym_cache::cli::commands::config(args, &config, &config_manager).await;
    }

    ConfigManager::ensure_state_dirs(&config).await?;

    match cli.command {
        Commands::Config(_) => unreachable!("Config handled above"),
        Commands::Install => recym_cache::cli::commands::install(&config).await,
        Commands::Activate => recym_cache::cli::commands::activate(&config).await,
        Commands::Fetch(args) => recym_cache::cli::commands::fetch(args, &config).await,
        Commands::Route(args) => recym_cache::cli::commands::route(args, &config).await,
        Commands::Message(args) => recym_cache::cli::commands::message(args, &config).await,
        Commands::Push(args) => recym_cache::cli::commands::push(args, &config).await,
        Commands::Click(args) => recym_cache::cli::commands::click(args, &config).await,
        Commands::Status(args) => recym_cache::cli::commands::status(args, &config).await,
    }
}

/// 0 = warn, 1 = info, 2+ = debug. `general.verbose` raises the floor to info.
fn init_logging(verbose: u8, config: &Config) {
    let level = match verbose.max(u8::from(config.general.verbose)) {
        0 => "recym_cache=warn",
        1 => "recym_cache=info",
        _ => "recym_cache=debug",
    };
    let filter = EnvFilter::new(level);

    if config.general.log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .init();
    }
}
