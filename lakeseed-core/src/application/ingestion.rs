// lakeseed-core/src/application/ingestion.rs

use futures::StreamExt;
use std::collections::HashSet;
use std::time::Instant;
use tracing::{info, instrument, warn};

use crate::domain::namespace::RawNamespace;
use crate::domain::project::configuration::{DEFAULT_CHUNK_SIZE, DEFAULT_MAX_CONCURRENCY};
use crate::domain::report::{IngestionReport, PerTableResult};
use crate::domain::table::TableBatch;
use crate::error::LakeseedError;
use crate::ports::connector::ConnectionFactory;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestOptions {
    pub max_concurrency: usize,
    pub chunk_size: usize,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Loads every batch into `namespace`, at most `max_concurrency` at a time.
/// Each table gets its own connection. A failing table never affects its
/// siblings; the report lists one result per batch, in input order.
#[instrument(skip_all, fields(namespace = %namespace, tables = batches.len()))]
pub async fn ingest_all(
    factory: &dyn ConnectionFactory,
    namespace: &RawNamespace,
    batches: &[TableBatch],
    options: &IngestOptions,
) -> IngestionReport {
    if batches.is_empty() {
        return IngestionReport::default();
    }

    let pool = options.max_concurrency.max(1).min(batches.len());
    info!(workers = pool, "Loading {} tables", batches.len());

    let mut seen = HashSet::new();
    let first_occurrence: Vec<bool> = batches.iter().map(|b| seen.insert(b.name.as_str())).collect();

    let tasks = batches
        .iter()
        .zip(first_occurrence)
        .enumerate()
        .map(|(index, (batch, first))| async move {
            let result = if !first {
                warn!(table = %batch.name, "Duplicate table name, skipped");
                PerTableResult::failed(&batch.name, "table name appears more than once in this run")
            } else {
                match load_table(factory, namespace, batch, options.chunk_size).await {
                    Ok(rows) => PerTableResult::loaded(&batch.name, rows),
                    Err(e) => {
                        warn!(table = %batch.name, error = %e, "Table failed to load");
                        PerTableResult::failed(&batch.name, e)
                    }
                }
            };
            (index, result)
        });

    let mut indexed: Vec<(usize, PerTableResult)> =
        futures::stream::iter(tasks).buffer_unordered(pool).collect().await;
    indexed.sort_by_key(|(index, _)| *index);

    let report = IngestionReport {
        results: indexed.into_iter().map(|(_, result)| result).collect(),
    };
    info!(
        failed = report.failed_tables().len(),
        "Ingestion finished"
    );
    report
}

async fn load_table(
    factory: &dyn ConnectionFactory,
    namespace: &RawNamespace,
    batch: &TableBatch,
    chunk_size: usize,
) -> Result<u64, LakeseedError> {
    let fail = |reason: String| LakeseedError::Ingestion {
        table: batch.name.clone(),
        reason,
    };

    batch.validate().map_err(fail)?;

    let start = Instant::now();
    let connector = factory.connect().await.map_err(|e| fail(e.to_string()))?;

    let loaded = connector
        .bulk_insert(namespace, batch, chunk_size)
        .await
        .map_err(|e| fail(e.to_string()));

    // Released on success and failure alike.
    if let Err(e) = connector.close().await {
        warn!(table = %batch.name, error = %e, "Closing connection failed");
    }

    if let Ok(rows) = &loaded {
        info!(table = %batch.name, rows, "Loaded in {:.2?}", start.elapsed());
    }
    loaded
}
