//! MasterStudio bot - publishes website posts from Discord.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use masterstudio_bot::cli;
use masterstudio_bot::config::Config;
use masterstudio_bot::Error;

#[derive(Parser)]
#[command(name = "masterstudio-bot")]
#[command(about = "Discord bot that publishes MasterStudio posts to GitHub")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ~/.masterstudio/config.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Register commands and serve interactions (default)
    Serve,

    /// Only register the slash commands in the configured guild
    Register,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("masterstudio_bot=info"));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let args = Cli::parse();
    let config = Config::load(args.config.as_deref())?;

    match args.command.unwrap_or(Commands::Serve) {
        Commands::Serve => cli::serve::run(config).await?,
        Commands::Register => cli::register::run(&config).await?,
    }

    Ok(())
}
