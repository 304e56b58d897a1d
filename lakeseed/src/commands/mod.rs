// lakeseed/src/commands/mod.rs
//
// Shared wiring for the domain-scoped commands: project + option-set loading,
// adapter selection per engine, run summary.

pub mod check;
pub mod clean;
pub mod deploy;
pub mod reset;
pub mod run;

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};
use tracing::debug;

use lakeseed_core::application::{IngestOptions, PipelineOptions, RetryPolicy, RetryingCatalogApi};
use lakeseed_core::domain::config::{EffectiveConfig, OptionSet, keys};
use lakeseed_core::domain::project::{Engine, ProjectConfig};
use lakeseed_core::domain::report::{DeploymentStatus, RunReport, RunStatus, TableOutcome};
use lakeseed_core::infrastructure::adapters::catalog_http::HttpCatalogApi;
use lakeseed_core::infrastructure::adapters::duckdb::DuckDBConnectionFactory;
use lakeseed_core::infrastructure::adapters::trino::TrinoConnectionFactory;
use lakeseed_core::infrastructure::config::{
    LoadedDefinitions, SETTINGS_FILE, load_definitions, load_option_set, load_project_config,
};
use lakeseed_core::infrastructure::fs::atomic_write;
use lakeseed_core::ports::{CatalogApi, ConnectionFactory};

use crate::cli::DomainArgs;

pub const RUN_RESULTS_FILE: &str = "run_results.json";
pub const PAYLOADS_FILE: &str = "payloads.json";

/// Everything a domain-scoped command reads from disk before touching a remote.
pub struct DomainContext {
    pub project_dir: PathBuf,
    pub domain: String,
    pub config: ProjectConfig,
    pub global: OptionSet,
    pub domain_options: OptionSet,
}

/// Engine sessions and the semantic-layer client for one run.
pub struct Backend {
    pub factory: Box<dyn ConnectionFactory>,
    pub catalog: Box<dyn CatalogApi>,
}

impl DomainContext {
    pub fn load(args: &DomainArgs) -> anyhow::Result<Self> {
        println!("⚙️  Loading configuration...");
        let config = load_project_config(&args.project_dir).with_context(|| {
            format!(
                "Failed to load project configuration from {:?}",
                args.project_dir
            )
        })?;

        let domain_dir = args
            .project_dir
            .join(&config.domains_path)
            .join(&args.domain);
        if !domain_dir.is_dir() {
            bail!(
                "Domain '{}' not found at {}",
                args.domain,
                domain_dir.display()
            );
        }

        let global = load_option_set(&args.project_dir.join(SETTINGS_FILE))?;
        let domain_options = load_option_set(&domain_dir.join(SETTINGS_FILE))?;
        println!(
            "   Project: {} | Domain: {} | Engine: {:?}",
            config.name, args.domain, config.engine
        );

        Ok(Self {
            project_dir: args.project_dir.clone(),
            domain: args.domain.clone(),
            config,
            global,
            domain_options,
        })
    }

    pub fn domain_dir(&self) -> PathBuf {
        self.project_dir
            .join(&self.config.domains_path)
            .join(&self.domain)
    }

    pub fn target_dir(&self) -> PathBuf {
        self.project_dir.join(&self.config.target_path)
    }

    pub fn definitions(&self) -> anyhow::Result<LoadedDefinitions> {
        let dir = self.domain_dir().join("definitions");
        load_definitions(&dir)
            .with_context(|| format!("Failed to read definitions from {}", dir.display()))
    }

    pub fn pipeline_options(&self, tolerate_partial: bool) -> PipelineOptions {
        let options = PipelineOptions {
            ingest: IngestOptions {
                max_concurrency: self.config.ingestion.max_concurrency,
                chunk_size: self.config.ingestion.chunk_size,
            },
            tolerate_partial_ingestion: tolerate_partial || self.config.ingestion.tolerate_partial,
            ..PipelineOptions::default()
        };
        match self.config.engine {
            Engine::Trino => options.with_required_key(keys::USER),
            Engine::DuckDB => options,
        }
    }

    /// Adapters for the configured engine. Catalog calls always go through
    /// the retry policy.
    pub fn backend(&self, effective: &EffectiveConfig) -> anyhow::Result<Backend> {
        let policy = RetryPolicy::from(&self.config.retry);
        debug!(engine = ?self.config.engine, retry = ?policy, "Building adapters");
        match self.config.engine {
            Engine::DuckDB => {
                let db_path = self.project_dir.join(&self.config.database_path);
                let factory = DuckDBConnectionFactory::open(&db_path.to_string_lossy())
                    .with_context(|| {
                        format!("Failed to initialize DuckDB at {}", db_path.display())
                    })?;
                let catalog = RetryingCatalogApi::new(factory.catalog()?, policy);
                Ok(Backend {
                    factory: Box::new(factory),
                    catalog: Box::new(catalog),
                })
            }
            Engine::Trino => {
                let factory = TrinoConnectionFactory::from_config(effective)?;
                let catalog = RetryingCatalogApi::new(HttpCatalogApi::from_config(effective)?, policy);
                Ok(Backend {
                    factory: Box::new(factory),
                    catalog: Box::new(catalog),
                })
            }
        }
    }
}

/// Writes the report, prints the summary, and exits non-zero unless every
/// table and every definition went through.
pub fn conclude(report: &RunReport, target_dir: &Path) -> anyhow::Result<()> {
    let path = target_dir.join(RUN_RESULTS_FILE);
    let json = report.to_json()?;
    atomic_write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;

    print_summary(report);
    println!("   Report: {}", path.display());

    match report.status() {
        RunStatus::FullySuccessful => {
            println!("\n✨ SUCCESS! Run {}.", report.status());
            Ok(())
        }
        RunStatus::PartiallySuccessful => {
            eprintln!("\n⚠️  Run {}.", report.status());
            std::process::exit(1);
        }
        RunStatus::Aborted => {
            eprintln!(
                "\n💥 Run aborted: {}",
                report.aborted.as_deref().unwrap_or("unknown reason")
            );
            std::process::exit(1);
        }
    }
}

pub fn print_summary(report: &RunReport) {
    if report.tables.is_empty() && report.deployments.is_empty() {
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Kind", "Name", "Status", "Detail"]);

    for result in &report.tables {
        let (status, detail) = match &result.outcome {
            TableOutcome::Loaded { rows } => ("loaded", format!("{} rows", rows)),
            TableOutcome::Failed { error } => ("failed", error.clone()),
        };
        table.add_row(vec![
            "table".to_string(),
            result.table.clone(),
            status.to_string(),
            detail,
        ]);
    }

    for deployment in &report.deployments {
        let status = match deployment.status {
            DeploymentStatus::Created => "created",
            DeploymentStatus::Updated => "updated",
            DeploymentStatus::Failed => "failed",
        };
        let detail = deployment
            .error
            .clone()
            .or_else(|| deployment.remote_id.clone())
            .unwrap_or_default();
        table.add_row(vec![
            "definition".to_string(),
            deployment.target.clone(),
            status.to_string(),
            detail,
        ]);
    }

    println!("{table}");
}
