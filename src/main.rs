//! Media Copier CLI
//!
//! A command-line tool for sorting photos and videos into folders by timestamp.

use clap::Parser;
use media_copier::cli::{
    args::{Cli, Commands, ConfigAction},
    commands::{config, run},
};
use media_copier::models::config::Action;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    // Run the appropriate command
    match cli.command {
        Commands::Copy(args) => {
            run::run_job(Action::Copy, &args).await?;
        }

        Commands::Move(args) => {
            run::run_job(Action::Move, &args).await?;
        }

        Commands::Simulate(args) => {
            run::run_job(Action::Simulate, &args).await?;
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => config::show_config()?,
            ConfigAction::Path => config::show_config_path(),
        },
    }

    Ok(())
}

/// Initialize the logging system.
fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("media_copier=debug")
    } else {
        EnvFilter::new("media_copier=info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}
