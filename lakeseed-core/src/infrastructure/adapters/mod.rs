// lakeseed-core/src/infrastructure/adapters/mod.rs

pub mod catalog_http;
pub mod duckdb;
pub mod trino;

pub use self::catalog_http::HttpCatalogApi;
pub use self::duckdb::{DuckDBCatalog, DuckDBConnectionFactory, DuckDBConnector};
pub use self::trino::{TrinoConnectionFactory, TrinoSettings};
