// Main entry point for stepreport

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use stepreport::cli::{Cli, Commands};
use stepreport::commands;
use stepreport::config::Config;
use stepreport::logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if cli.verbose {
        info!("Starting stepreport v{}", env!("CARGO_PKG_VERSION"));
    }

    // An explicitly named file must load; the default lookup is best effort
    let loaded = match &cli.config_file {
        Some(path) => Some(Config::load_required(path)?),
        None => Config::load(),
    };

    if cli.config {
        commands::show_config(loaded.as_ref());
        return Ok(());
    }

    if let Some(config_file) = &cli.init_config {
        return commands::init_config(config_file);
    }

    if let Some(shell_type) = &cli.completion {
        return commands::handle_completion(shell_type);
    }

    // Secrets apply even when no config file was found
    let config = match loaded {
        Some(config) => config,
        None => std::env::current_dir()
            .map(|cwd| Config::default_in(&cwd))
            .unwrap_or_default(),
    };

    let success = match &cli.command {
        Some(Commands::Replay(args)) => commands::handle_replay(&cli, args, &config).await?,
        Some(Commands::Validate(args)) => commands::handle_validate(args)?,
        Some(Commands::Count(args)) => {
            commands::handle_count(args)?;
            true
        }
        None => {
            warn!("No command given. Use 'stepreport --help' for usage.");
            true
        }
    };

    if !success {
        std::process::exit(1);
    }

    Ok(())
}
