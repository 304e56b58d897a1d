// lakeseed/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lakeseed")]
#[command(about = "Raw-schema provisioning, parallel loading and semantic-layer publishing", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Project + domain selection shared by every domain-scoped command.
#[derive(Args, Debug, Clone)]
pub struct DomainArgs {
    /// Project directory
    #[arg(long, default_value = ".")]
    pub project_dir: PathBuf,

    /// Domain folder under `domains-path` (ex: "sales")
    #[arg(long, short)]
    pub domain: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 🚀 Runs every stage (schema reset -> ingestion -> publishing)
    Run {
        #[command(flatten)]
        target: DomainArgs,

        /// Publish definitions even when a table they read from failed to load
        #[arg(long)]
        tolerate_partial: bool,
    },

    /// 🧨 Drops and recreates the raw schema only
    Reset {
        #[command(flatten)]
        target: DomainArgs,
    },

    /// 📡 Translates and publishes the semantic definitions
    Deploy {
        #[command(flatten)]
        target: DomainArgs,
    },

    /// 🔎 Resolves and translates offline, writes target/payloads.json
    Check {
        #[command(flatten)]
        target: DomainArgs,
    },

    /// 🧹 Cleans build artifacts (clean-targets)
    Clean {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
    },
}
