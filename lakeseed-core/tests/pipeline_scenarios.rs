// lakeseed-core/tests/pipeline_scenarios.rs

#![allow(clippy::unwrap_used)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use lakeseed_core::LakeseedError;
use lakeseed_core::application::{PipelineInputs, PipelineOptions, run_pipeline, translate};
use lakeseed_core::domain::config::OptionSet;
use lakeseed_core::domain::config::EffectiveConfig;
use lakeseed_core::domain::error::{ConfigError, TranslationError};
use lakeseed_core::domain::report::{DeploymentStatus, RunStatus, TableOutcome};
use lakeseed_core::domain::semantic::{DeploymentPayload, QualifiedName, SemanticDefinition};
use lakeseed_core::domain::sql::Dialect;
use lakeseed_core::domain::table::{Column, ColumnType, TableBatch, Value};
use lakeseed_core::infrastructure::error::InfrastructureError;
use lakeseed_core::ports::{CatalogApi, ConnectionFactory, Connector, RemoteObject};

// --- SPY ENGINE ---

#[derive(Default)]
struct Spy {
    connects: AtomicUsize,
    closes: AtomicUsize,
    statements: Mutex<Vec<String>>,
}

struct SpyFactory {
    spy: Arc<Spy>,
    /// Statements mentioning this table fail as if the connection dropped.
    broken_table: Option<&'static str>,
    /// Statements starting with this prefix fail.
    broken_prefix: Option<&'static str>,
}

impl SpyFactory {
    fn healthy() -> Self {
        Self {
            spy: Arc::new(Spy::default()),
            broken_table: None,
            broken_prefix: None,
        }
    }
}

struct SpyConnector {
    spy: Arc<Spy>,
    broken_table: Option<&'static str>,
    broken_prefix: Option<&'static str>,
}

#[async_trait]
impl ConnectionFactory for SpyFactory {
    async fn connect(&self) -> Result<Box<dyn Connector>, LakeseedError> {
        self.spy.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(SpyConnector {
            spy: self.spy.clone(),
            broken_table: self.broken_table,
            broken_prefix: self.broken_prefix,
        }))
    }
}

#[async_trait]
impl Connector for SpyConnector {
    async fn execute(&self, sql: &str) -> Result<(), LakeseedError> {
        self.spy.statements.lock().unwrap().push(sql.to_string());
        let table_broken = self
            .broken_table
            .is_some_and(|t| sql.contains(&format!("\"{t}\"")));
        let prefix_broken = self.broken_prefix.is_some_and(|p| sql.starts_with(p));
        if table_broken || prefix_broken {
            return Err(LakeseedError::Infrastructure(InfrastructureError::Io(
                std::io::Error::new(std::io::ErrorKind::ConnectionReset, "connection reset"),
            )));
        }
        Ok(())
    }

    fn dialect(&self) -> Dialect {
        Dialect::Trino
    }

    async fn close(self: Box<Self>) -> Result<(), LakeseedError> {
        self.spy.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// --- IN-MEMORY CATALOG ---

#[derive(Default)]
struct MemoryCatalog {
    objects: Mutex<HashMap<QualifiedName, (String, DeploymentPayload)>>,
    creates: AtomicUsize,
}

#[async_trait]
impl CatalogApi for MemoryCatalog {
    async fn get_semantic_object(
        &self,
        name: &QualifiedName,
    ) -> Result<Option<RemoteObject>, LakeseedError> {
        Ok(self
            .objects
            .lock()
            .unwrap()
            .get(name)
            .map(|(id, _)| RemoteObject { id: id.clone() }))
    }

    async fn create_semantic_object(
        &self,
        payload: &DeploymentPayload,
    ) -> Result<RemoteObject, LakeseedError> {
        let n = self.creates.fetch_add(1, Ordering::SeqCst) + 1;
        let id = format!("obj-{n}");
        self.objects
            .lock()
            .unwrap()
            .insert(payload.target.clone(), (id.clone(), payload.clone()));
        Ok(RemoteObject { id })
    }

    async fn update_semantic_object(
        &self,
        existing: &RemoteObject,
        payload: &DeploymentPayload,
    ) -> Result<RemoteObject, LakeseedError> {
        self.objects
            .lock()
            .unwrap()
            .insert(payload.target.clone(), (existing.id.clone(), payload.clone()));
        Ok(existing.clone())
    }
}

// --- FIXTURES ---

fn options(pairs: &[(&str, &str)]) -> OptionSet {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn batch(name: &str, rows: i64) -> TableBatch {
    TableBatch::new(
        name,
        vec![
            Column::new("id", ColumnType::BigInt),
            Column::new("label", ColumnType::Varchar),
        ],
    )
    .with_rows(
        (0..rows)
            .map(|i| vec![Value::Int(i), Value::Text(format!("row {i}"))])
            .collect(),
    )
}

fn scenario_inputs(definitions: Vec<SemanticDefinition>) -> PipelineInputs {
    PipelineInputs {
        global: options(&[
            ("HOST", "h"),
            ("PORT", "443"),
            ("SCHEMA_LOCATION_BASE", "s3://b/"),
            ("SEMANTIC_CATALOG", "dp"),
            ("SEMANTIC_SCHEMA", "sales"),
        ]),
        domain: options(&[("SCHEMA", "demo_raw")]),
        batches: vec![batch("orders", 3), batch("customers", 2)],
        definitions,
        definition_failures: Vec::new(),
    }
}

fn orders_view() -> SemanticDefinition {
    SemanticDefinition::view(
        "orders_v",
        "${SEMANTIC_CATALOG}.${SEMANTIC_SCHEMA}",
        "SELECT id, label FROM ${SCHEMA}.orders",
    )
}

// --- SCENARIOS ---

#[tokio::test]
async fn successful_run_loads_both_tables_and_creates_the_view() {
    let factory = SpyFactory::healthy();
    let catalog = MemoryCatalog::default();
    let inputs = scenario_inputs(vec![orders_view()]);

    let report = run_pipeline(&inputs, &PipelineOptions::default(), &factory, &catalog)
        .await
        .unwrap();

    assert_eq!(report.status(), RunStatus::FullySuccessful);
    assert_eq!(report.tables.len(), 2);
    assert_eq!(report.tables[0].table, "orders");
    assert_eq!(report.tables[0].rows(), Some(3));
    assert_eq!(report.tables[1].table, "customers");
    assert_eq!(report.tables[1].rows(), Some(2));

    assert_eq!(report.deployments.len(), 1);
    assert_eq!(report.deployments[0].status, DeploymentStatus::Created);
    assert_eq!(report.deployments[0].target, "dp.sales.orders_v");

    let objects = catalog.objects.lock().unwrap();
    let (_, published) = objects
        .get(&QualifiedName::new("dp", "sales", "orders_v"))
        .unwrap();
    assert_eq!(
        published.definition_query,
        "SELECT id, label FROM demo_raw.orders"
    );

    let statements = factory.spy.statements.lock().unwrap();
    assert_eq!(
        statements[0],
        "DROP SCHEMA IF EXISTS \"demo_raw\" CASCADE"
    );
    assert_eq!(
        statements[1],
        "CREATE SCHEMA \"demo_raw\" WITH (location = 's3://b/demo_raw/')"
    );
    // one session for the reset, one per table; all released
    assert_eq!(factory.spy.connects.load(Ordering::SeqCst), 3);
    assert_eq!(factory.spy.closes.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn failed_table_makes_the_run_partial_but_the_view_still_publishes() {
    let factory = SpyFactory {
        broken_table: Some("customers"),
        ..SpyFactory::healthy()
    };
    let catalog = MemoryCatalog::default();
    let inputs = scenario_inputs(vec![orders_view()]);

    let report = run_pipeline(&inputs, &PipelineOptions::default(), &factory, &catalog)
        .await
        .unwrap();

    assert_eq!(report.status(), RunStatus::PartiallySuccessful);
    assert!(report.tables[0].is_success());
    match &report.tables[1].outcome {
        TableOutcome::Failed { error } => assert!(error.contains("connection reset")),
        other => panic!("customers should have failed, got {other:?}"),
    }
    assert_eq!(report.deployments.len(), 1);
    assert_eq!(report.deployments[0].status, DeploymentStatus::Created);

    assert_eq!(
        factory.spy.connects.load(Ordering::SeqCst),
        factory.spy.closes.load(Ordering::SeqCst)
    );
}

#[tokio::test]
async fn definitions_reading_a_failed_table_are_held_back_unless_tolerated() {
    let customers_view = SemanticDefinition::view(
        "customers_v",
        "${SEMANTIC_CATALOG}.${SEMANTIC_SCHEMA}",
        "SELECT c.id FROM ${SCHEMA}.customers c",
    );

    let factory = SpyFactory {
        broken_table: Some("customers"),
        ..SpyFactory::healthy()
    };
    let catalog = MemoryCatalog::default();
    let inputs = scenario_inputs(vec![orders_view(), customers_view]);

    let report = run_pipeline(&inputs, &PipelineOptions::default(), &factory, &catalog)
        .await
        .unwrap();
    assert_eq!(report.deployments[0].status, DeploymentStatus::Created);
    assert_eq!(report.deployments[1].status, DeploymentStatus::Failed);
    assert!(
        report.deployments[1]
            .error
            .as_deref()
            .unwrap()
            .contains("customers")
    );

    let tolerant = PipelineOptions {
        tolerate_partial_ingestion: true,
        ..PipelineOptions::default()
    };
    let report = run_pipeline(&inputs, &tolerant, &factory, &catalog)
        .await
        .unwrap();
    assert_eq!(report.deployments[0].status, DeploymentStatus::Updated);
    assert_eq!(report.deployments[1].status, DeploymentStatus::Created);
}

#[tokio::test]
async fn missing_configuration_aborts_before_any_connection() {
    let factory = SpyFactory::healthy();
    let catalog = MemoryCatalog::default();
    let mut inputs = scenario_inputs(vec![orders_view()]);
    inputs.global.remove("HOST");
    inputs.domain.clear();

    let err = run_pipeline(&inputs, &PipelineOptions::default(), &factory, &catalog)
        .await
        .unwrap_err();

    match err {
        LakeseedError::Config(ConfigError::Missing(keys)) => {
            assert_eq!(keys, vec!["HOST".to_string(), "SCHEMA".to_string()]);
        }
        other => panic!("expected a config error, got {other}"),
    }
    assert_eq!(factory.spy.connects.load(Ordering::SeqCst), 0);
    assert!(factory.spy.statements.lock().unwrap().is_empty());
    assert_eq!(catalog.creates.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failing_schema_reset_stops_before_ingestion() {
    let factory = SpyFactory {
        broken_prefix: Some("CREATE SCHEMA"),
        ..SpyFactory::healthy()
    };
    let catalog = MemoryCatalog::default();
    let inputs = scenario_inputs(vec![orders_view()]);

    let err = run_pipeline(&inputs, &PipelineOptions::default(), &factory, &catalog)
        .await
        .unwrap_err();

    assert!(matches!(err, LakeseedError::SchemaReset { .. }));
    let statements = factory.spy.statements.lock().unwrap();
    assert_eq!(statements.len(), 2);
    assert!(!statements.iter().any(|s| s.contains("\"orders\"")));
    assert_eq!(factory.spy.closes.load(Ordering::SeqCst), 1);
    assert_eq!(catalog.creates.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn publishing_twice_creates_once_then_updates() {
    let factory = SpyFactory::healthy();
    let catalog = MemoryCatalog::default();
    let inputs = scenario_inputs(vec![orders_view()]);

    let first = run_pipeline(&inputs, &PipelineOptions::default(), &factory, &catalog)
        .await
        .unwrap();
    let second = run_pipeline(&inputs, &PipelineOptions::default(), &factory, &catalog)
        .await
        .unwrap();

    assert_eq!(first.deployments[0].status, DeploymentStatus::Created);
    assert_eq!(second.deployments[0].status, DeploymentStatus::Updated);
    assert_eq!(first.deployments[0].remote_id, second.deployments[0].remote_id);
    assert_eq!(catalog.creates.load(Ordering::SeqCst), 1);
    assert_eq!(catalog.objects.lock().unwrap().len(), 1);
}

#[test]
fn translation_is_deterministic_and_isolates_unresolved_placeholders() {
    let inputs = scenario_inputs(vec![
        orders_view(),
        SemanticDefinition::view(
            "broken_v",
            "${SEMANTIC_CATALOG}.${SEMANTIC_SCHEMA}",
            "SELECT * FROM ${NOT_CONFIGURED}.orders",
        ),
        SemanticDefinition::materialized_view(
            "daily",
            "${SEMANTIC_CATALOG}.${SEMANTIC_SCHEMA}",
            "SELECT count(*) FROM ${SCHEMA}.orders",
            "4h",
        ),
    ]);
    let config = EffectiveConfig::merge(&inputs.global, &inputs.domain);

    let first = translate(&inputs.definitions, &config);
    let second = translate(&inputs.definitions, &config);

    let as_json = |results: &[Result<DeploymentPayload, TranslationError>]| -> Vec<String> {
        results
            .iter()
            .filter_map(|r| r.as_ref().ok())
            .map(|p| serde_json::to_string(p).unwrap())
            .collect()
    };
    assert_eq!(as_json(&first), as_json(&second));
    assert!(first[0].is_ok());
    assert!(first[1].is_err());
    assert!(first[2].is_ok());
}
