// lakeseed-core/src/application/pipeline.rs

// Resolve -> reset -> ingest -> translate -> publish. Each stage starts once
// the previous one has produced its aggregate result.

use chrono::Utc;
use tracing::{info, instrument, warn};

use crate::application::ingestion::{IngestOptions, ingest_all};
use crate::application::publish::publish;
use crate::application::schema::reset_namespace;
use crate::application::translation::translate;
use crate::domain::compiler::RelationScanner;
use crate::domain::config::{EffectiveConfig, OptionSet, PIPELINE_REQUIRED_KEYS, resolve};
use crate::domain::namespace::RawNamespace;
use crate::domain::report::{DeploymentResult, RunReport};
use crate::domain::semantic::{DeploymentPayload, SemanticDefinition};
use crate::domain::table::TableBatch;
use crate::error::LakeseedError;
use crate::ports::catalog_api::CatalogApi;
use crate::ports::connector::ConnectionFactory;

/// Everything one run consumes. Batches come from an external generator.
#[derive(Debug, Clone, Default)]
pub struct PipelineInputs {
    pub global: OptionSet,
    pub domain: OptionSet,
    pub batches: Vec<TableBatch>,
    pub definitions: Vec<SemanticDefinition>,
    /// Definition sources that could not be read; reported as failed deployments.
    pub definition_failures: Vec<DeploymentResult>,
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub required_keys: Vec<String>,
    pub ingest: IngestOptions,
    /// Publish definitions even when a table they read from failed to load.
    pub tolerate_partial_ingestion: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            required_keys: PIPELINE_REQUIRED_KEYS.iter().map(|k| k.to_string()).collect(),
            ingest: IngestOptions::default(),
            tolerate_partial_ingestion: false,
        }
    }
}

impl PipelineOptions {
    pub fn with_required_key(mut self, key: &str) -> Self {
        if !self.required_keys.iter().any(|k| k == key) {
            self.required_keys.push(key.to_string());
        }
        self
    }
}

/// Configuration resolution plus namespace derivation. No side effects.
pub fn prepare(
    global: &OptionSet,
    domain: &OptionSet,
    required_keys: &[String],
) -> Result<(EffectiveConfig, RawNamespace), LakeseedError> {
    let required: Vec<&str> = required_keys.iter().map(String::as_str).collect();
    let config = resolve(global, domain, &required)?;
    let namespace = RawNamespace::from_config(&config)?;
    Ok((config, namespace))
}

/// Opens one connection, resets the namespace, and closes it again.
pub async fn reset_with(
    factory: &dyn ConnectionFactory,
    namespace: &RawNamespace,
) -> Result<(), LakeseedError> {
    let connector = factory.connect().await?;
    let outcome = reset_namespace(connector.as_ref(), namespace).await;
    if let Err(e) = connector.close().await {
        warn!(error = %e, "Closing schema connection failed");
    }
    outcome
}

/// Translates, holds back definitions built on failed tables, publishes the
/// rest. One result per definition, in definition order.
#[instrument(skip_all, fields(definitions = definitions.len(), failed_tables = failed_tables.len()))]
pub async fn deploy_definitions(
    api: &dyn CatalogApi,
    definitions: &[SemanticDefinition],
    config: &EffectiveConfig,
    failed_tables: &[&str],
    tolerate_partial_ingestion: bool,
) -> Vec<DeploymentResult> {
    enum Slot {
        Ready(usize),
        Done(DeploymentResult),
    }

    // Missing raw keys only loosen matching to table names.
    let raw = RawNamespace::from_config(config).ok();
    let mut ready: Vec<DeploymentPayload> = Vec::new();
    let slots: Vec<Slot> = definitions
        .iter()
        .zip(translate(definitions, config))
        .map(|(definition, translated)| match translated {
            Err(e) => {
                warn!(definition = %definition.label(), error = %e, "Translation failed");
                Slot::Done(DeploymentResult::failed(&definition.label(), e))
            }
            Ok(payload) => {
                let blocked = if tolerate_partial_ingestion {
                    Vec::new()
                } else {
                    RelationScanner::referenced(
                        &payload.definition_query,
                        raw.as_ref(),
                        failed_tables.iter().copied(),
                    )
                };
                if blocked.is_empty() {
                    ready.push(payload);
                    Slot::Ready(ready.len() - 1)
                } else {
                    warn!(target = %payload.target, tables = ?blocked, "Held back");
                    Slot::Done(DeploymentResult::failed(
                        &payload.target.to_string(),
                        format!("depends on failed table(s): {}", blocked.join(", ")),
                    ))
                }
            }
        })
        .collect();

    let mut published = publish(api, &ready).await.into_iter().map(Some).collect::<Vec<_>>();

    slots
        .into_iter()
        .map(|slot| match slot {
            Slot::Done(result) => result,
            Slot::Ready(index) => published
                .get_mut(index)
                .and_then(Option::take)
                .unwrap_or_else(|| DeploymentResult::failed("unknown", "publisher returned no result")),
        })
        .collect()
}

/// One full run. Pre-flight problems (configuration, schema reset) come back
/// as `Err`; everything after that is recorded in the report.
#[instrument(skip_all, fields(tables = inputs.batches.len(), definitions = inputs.definitions.len()))]
pub async fn run_pipeline(
    inputs: &PipelineInputs,
    options: &PipelineOptions,
    factory: &dyn ConnectionFactory,
    api: &dyn CatalogApi,
) -> Result<RunReport, LakeseedError> {
    let mut report = RunReport::new(Utc::now());

    // 1. RESOLVE (nothing remote has been touched yet)
    let (config, namespace) = prepare(&inputs.global, &inputs.domain, &options.required_keys)?;
    info!(namespace = %namespace, keys = config.len(), "Configuration resolved");

    // 2. SCHEMA
    reset_with(factory, &namespace).await?;

    // 3. INGESTION
    let ingestion = ingest_all(factory, &namespace, &inputs.batches, &options.ingest).await;
    let failed_tables = ingestion.failed_tables();
    if !failed_tables.is_empty() {
        warn!(tables = ?failed_tables, "Some tables failed to load");
    }

    // 4 + 5. TRANSLATE & PUBLISH
    let deployments = deploy_definitions(
        api,
        &inputs.definitions,
        &config,
        &failed_tables,
        options.tolerate_partial_ingestion,
    )
    .await;

    report.tables = ingestion.results;
    report.deployments = inputs.definition_failures.clone();
    report.deployments.extend(deployments);

    let report = report.finish();
    info!(status = %report.status(), "Run finished");
    Ok(report)
}
