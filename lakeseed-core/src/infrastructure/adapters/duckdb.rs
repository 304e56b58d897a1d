// lakeseed-core/src/infrastructure/adapters/duckdb.rs

use async_trait::async_trait;
use duckdb::{Config, Connection, params};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::domain::namespace::quote_ident;
use crate::domain::semantic::{DeploymentPayload, QualifiedName, SemanticKind};
use crate::domain::sql::Dialect;
use crate::error::LakeseedError;
use crate::infrastructure::error::{DatabaseError, InfrastructureError};
use crate::ports::catalog_api::{CatalogApi, RemoteObject};
use crate::ports::connector::{ConnectionFactory, Connector};

fn open(db_path: &str) -> Result<Connection, InfrastructureError> {
    let config = Config::default();
    let conn = if db_path == ":memory:" {
        Connection::open_in_memory_with_flags(config)?
    } else {
        if let Some(parent) = Path::new(db_path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        Connection::open_with_flags(db_path, config)?
    };
    Ok(conn)
}

fn poisoned() -> LakeseedError {
    LakeseedError::Infrastructure(InfrastructureError::Poisoned("DuckDB connection".into()))
}

fn db_error(e: duckdb::Error) -> LakeseedError {
    LakeseedError::Infrastructure(InfrastructureError::Database(DatabaseError::DuckDB(e)))
}

// --- CONNECTOR ---

/// One DuckDB session. Statements run on the blocking pool so sessions
/// cloned from the same database load side by side.
pub struct DuckDBConnector {
    conn: Arc<Mutex<Connection>>,
}

impl DuckDBConnector {
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// First column of the first row, as an integer.
    pub fn query_scalar(&self, sql: &str) -> Result<i64, LakeseedError> {
        let conn = self.conn.lock().map_err(|_| poisoned())?;
        conn.query_row(sql, [], |row| row.get::<_, i64>(0))
            .map_err(db_error)
    }
}

async fn blocking<T, F>(task: F) -> Result<T, LakeseedError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, LakeseedError> + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| LakeseedError::InternalError(format!("DuckDB task failed: {}", e)))?
}

#[async_trait]
impl Connector for DuckDBConnector {
    async fn execute(&self, sql: &str) -> Result<(), LakeseedError> {
        let conn = Arc::clone(&self.conn);
        let sql = sql.to_string();
        blocking(move || {
            let conn = conn.lock().map_err(|_| poisoned())?;
            conn.execute_batch(&sql).map_err(db_error)
        })
        .await
    }

    fn dialect(&self) -> Dialect {
        Dialect::DuckDB
    }

    async fn close(self: Box<Self>) -> Result<(), LakeseedError> {
        let conn = Arc::try_unwrap(self.conn).map_err(|_| {
            LakeseedError::InternalError("DuckDB session still in use at close".into())
        })?;
        blocking(move || {
            let conn = conn.into_inner().map_err(|_| poisoned())?;
            conn.close().map_err(|(_, e)| db_error(e))
        })
        .await
    }
}

// --- FACTORY ---

/// Hands out sessions cloned from one root database handle.
pub struct DuckDBConnectionFactory {
    root: Mutex<Connection>,
}

impl DuckDBConnectionFactory {
    pub fn open(db_path: &str) -> Result<Self, InfrastructureError> {
        debug!(path = db_path, "Opening DuckDB database");
        Ok(Self {
            root: Mutex::new(open(db_path)?),
        })
    }

    pub fn in_memory() -> Result<Self, InfrastructureError> {
        Self::open(":memory:")
    }

    fn clone_connection(&self) -> Result<Connection, LakeseedError> {
        let root = self.root.lock().map_err(|_| poisoned())?;
        root.try_clone().map_err(db_error)
    }

    /// A session outside the pool, e.g. for inspection after a run.
    pub fn session(&self) -> Result<DuckDBConnector, LakeseedError> {
        Ok(DuckDBConnector::from_connection(self.clone_connection()?))
    }

    /// Local semantic layer on the same database.
    pub fn catalog(&self) -> Result<DuckDBCatalog, LakeseedError> {
        Ok(DuckDBCatalog::from_connection(self.clone_connection()?))
    }
}

#[async_trait]
impl ConnectionFactory for DuckDBConnectionFactory {
    async fn connect(&self) -> Result<Box<dyn Connector>, LakeseedError> {
        Ok(Box::new(self.session()?))
    }
}

// --- LOCAL SEMANTIC LAYER ---

/// Publishes views as views and materialized views as snapshot tables.
/// DuckDB is single-catalog, so the catalog part of a name is ignored.
pub struct DuckDBCatalog {
    conn: Mutex<Connection>,
}

impl DuckDBCatalog {
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn object_id(name: &QualifiedName) -> String {
        format!("{}.{}", name.schema, name.name)
    }

    fn table_type(conn: &Connection, name: &QualifiedName) -> Result<Option<String>, LakeseedError> {
        let mut stmt = conn
            .prepare(
                "SELECT table_type FROM information_schema.tables \
                 WHERE table_schema = ? AND table_name = ?",
            )
            .map_err(db_error)?;
        let mut rows = stmt
            .query(params![name.schema, name.name])
            .map_err(db_error)?;
        match rows.next().map_err(db_error)? {
            Some(row) => Ok(Some(row.get::<_, String>(0).map_err(db_error)?)),
            None => Ok(None),
        }
    }

    fn create_statement(payload: &DeploymentPayload, replace: bool) -> String {
        let target = Dialect::DuckDB.qualify_object(
            &payload.target.catalog,
            &payload.target.schema,
            &payload.target.name,
        );
        let or_replace = if replace { "OR REPLACE " } else { "" };
        let object = match payload.kind {
            SemanticKind::View => "VIEW",
            SemanticKind::MaterializedView => "TABLE",
        };
        format!(
            "CREATE {}{} {} AS {}",
            or_replace, object, target, payload.definition_query
        )
    }
}

#[async_trait]
impl CatalogApi for DuckDBCatalog {
    async fn get_semantic_object(
        &self,
        name: &QualifiedName,
    ) -> Result<Option<RemoteObject>, LakeseedError> {
        let conn = self.conn.lock().map_err(|_| poisoned())?;
        Ok(Self::table_type(&conn, name)?.map(|_| RemoteObject {
            id: Self::object_id(name),
        }))
    }

    async fn create_semantic_object(
        &self,
        payload: &DeploymentPayload,
    ) -> Result<RemoteObject, LakeseedError> {
        let conn = self.conn.lock().map_err(|_| poisoned())?;
        if Self::table_type(&conn, &payload.target)?.is_some() {
            return Err(LakeseedError::Infrastructure(InfrastructureError::Api {
                status: 409,
                body: format!("{} already exists", payload.target),
            }));
        }

        let sql = format!(
            "CREATE SCHEMA IF NOT EXISTS {}; {};",
            quote_ident(&payload.target.schema),
            Self::create_statement(payload, false)
        );
        conn.execute_batch(&sql).map_err(db_error)?;
        Ok(RemoteObject {
            id: Self::object_id(&payload.target),
        })
    }

    async fn update_semantic_object(
        &self,
        existing: &RemoteObject,
        payload: &DeploymentPayload,
    ) -> Result<RemoteObject, LakeseedError> {
        let conn = self.conn.lock().map_err(|_| poisoned())?;
        let target = Dialect::DuckDB.qualify_object(
            &payload.target.catalog,
            &payload.target.schema,
            &payload.target.name,
        );

        // A kind change (view <-> table) needs the old object gone first.
        let drop = match Self::table_type(&conn, &payload.target)?.as_deref() {
            Some("VIEW") => format!("DROP VIEW IF EXISTS {};", target),
            Some(_) => format!("DROP TABLE IF EXISTS {};", target),
            None => String::new(),
        };
        let sql = format!(
            "BEGIN TRANSACTION; CREATE SCHEMA IF NOT EXISTS {}; {} {}; COMMIT;",
            quote_ident(&payload.target.schema),
            drop,
            Self::create_statement(payload, false)
        );
        if let Err(e) = conn.execute_batch(&sql) {
            let _ = conn.execute_batch("ROLLBACK");
            return Err(db_error(e));
        }
        Ok(existing.clone())
    }
}
