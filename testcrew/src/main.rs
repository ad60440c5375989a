use anyhow::Result;
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
use cli::{Cli, Commands, CrewConfig};

fn main() -> Result<()> {
    // Parse CLI arguments first to get verbosity level
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    // API keys may live in a local .env file
    if dotenv::dotenv().is_ok() {
        debug!("Loaded environment from .env");
    }

    let config = CrewConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Run(args) => {
            info!("Run command: {:?}", args);
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(cli::commands::run::execute(args, config))?;
        }
        Commands::Analyze(args) => {
            info!("Analyze command: {:?}", args);
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(cli::commands::analyze::execute(args, config))?;
        }
        Commands::Check(args) => {
            info!("Check command: {:?}", args);
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(cli::commands::check::execute(args))?;
        }
    }

    Ok(())
}
