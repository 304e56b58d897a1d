// lakeseed/src/main.rs

mod cli;
mod commands;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG=debug lakeseed run ... to see per-statement details
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            target,
            tolerate_partial,
        } => commands::run::execute(target, tolerate_partial).await,
        Commands::Reset { target } => commands::reset::execute(target).await,
        Commands::Deploy { target } => commands::deploy::execute(target).await,
        Commands::Check { target } => commands::check::execute(target),
        Commands::Clean { project_dir } => commands::clean::execute(project_dir),
    }
}
