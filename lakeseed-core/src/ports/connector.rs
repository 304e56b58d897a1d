// lakeseed-core/src/ports/connector.rs

// What the pipeline needs from a query engine, without knowing which one.
// One Connector is one open session; the factory hands out a fresh one per
// table so concurrent loads never share a session.

use async_trait::async_trait;

use crate::domain::namespace::RawNamespace;
use crate::domain::sql::Dialect;
use crate::domain::table::TableBatch;
use crate::error::LakeseedError;

#[async_trait]
pub trait Connector: Send + Sync {
    async fn execute(&self, sql: &str) -> Result<(), LakeseedError>;

    fn dialect(&self) -> Dialect;

    /// Replace semantics: drop, create, then append rows in order.
    /// Returns the number of rows written.
    async fn bulk_insert(
        &self,
        namespace: &RawNamespace,
        batch: &TableBatch,
        chunk_size: usize,
    ) -> Result<u64, LakeseedError> {
        let dialect = self.dialect();
        self.execute(&dialect.drop_table(namespace, &batch.name))
            .await?;
        self.execute(&dialect.create_table(namespace, batch)).await?;
        for statement in dialect.insert_statements(namespace, batch, chunk_size) {
            self.execute(&statement).await?;
        }
        Ok(batch.row_count())
    }

    async fn close(self: Box<Self>) -> Result<(), LakeseedError>;
}

#[async_trait]
pub trait ConnectionFactory: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn Connector>, LakeseedError>;
}
