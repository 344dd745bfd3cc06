//! offgrid - offline cache lifecycle CLI
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use offgrid::cli::{Cli, Commands};
use offgrid::config::ConfigManager;
use offgrid::error::OffgridResult;
use std::process::ExitCode;
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

async fn run() -> OffgridResult<()> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = config_manager.load().await?;

    // 0 = warn, 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("offgrid=warn"),
        1 => EnvFilter::new("offgrid=info"),
        _ => EnvFilter::new("offgrid=debug"),
    };

    if config.general.log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .without_time()
            .init();
    }

    match cli.command {
        Commands::Install => offgrid::cli::commands::install(&config).await,
        Commands::Activate => offgrid::cli::commands::activate(&config).await,
        Commands::Fetch(args) => offgrid::cli::commands::fetch(args, &config).await,
        Commands::Message(args) => offgrid::cli::commands::message(args, &config).await,
        Commands::Status(args) => offgrid::cli::commands::status(args, &config).await,
        Commands::Config(args) => {
            offgrid::cli::commands::config(args, &config, &config_manager).await
        }
    }
}
