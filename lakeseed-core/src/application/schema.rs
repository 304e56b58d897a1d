// lakeseed-core/src/application/schema.rs

use tracing::{info, instrument};

use crate::application::engine::execute_statement;
use crate::domain::namespace::RawNamespace;
use crate::error::LakeseedError;
use crate::ports::connector::Connector;

/// Drops the namespace with everything in it, then recreates it empty at its
/// storage location. Running it twice leaves the same state as running it once.
#[instrument(skip(connector, namespace), fields(namespace = %namespace))]
pub async fn reset_namespace(
    connector: &dyn Connector,
    namespace: &RawNamespace,
) -> Result<(), LakeseedError> {
    let dialect = connector.dialect();
    let statements = [dialect.drop_schema(namespace), dialect.create_schema(namespace)];

    for statement in statements {
        execute_statement(connector, &statement)
            .await
            .map_err(|e| LakeseedError::SchemaReset {
                namespace: namespace.to_string(),
                statement: statement.clone(),
                reason: e.to_string(),
            })?;
    }

    info!(location = %namespace.location, "Namespace recreated");
    Ok(())
}
