// lakeseed-core/src/application/engine.rs

use std::time::Instant;
use tracing::{debug, error, instrument};

use crate::error::LakeseedError;
use crate::ports::connector::Connector;

/// Runs one statement with timing and logging around it.
#[instrument(skip(connector, sql), fields(sql.len = sql.len()))]
pub async fn execute_statement(connector: &dyn Connector, sql: &str) -> Result<(), LakeseedError> {
    let start = Instant::now();
    debug!("Executing: {}", sql);

    let result = connector.execute(sql).await;
    let duration = start.elapsed();

    match result {
        Ok(()) => {
            debug!("Statement finished in {:.2?}", duration);
            Ok(())
        }
        Err(e) => {
            error!("Statement failed after {:.2?}: {}", duration, e);
            Err(e)
        }
    }
}
