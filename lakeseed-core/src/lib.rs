// lakeseed-core/src/lib.rs

#![allow(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::perf)]

// --- HEXAGONAL MODULES ---

// 1. Ports (Interfaces / Traits)
// Connector + ConnectionFactory for the query engine, CatalogApi for the semantic layer.
pub mod ports;

// 2. Domain
// Config resolution, namespaces, table batches, semantic definitions, run report.
// Depends on nothing but itself.
pub mod domain;

// 3. Infrastructure (Adapters)
// DuckDB, Trino, HTTP catalog, YAML/CSV loaders.
pub mod infrastructure;

// 4. Application (Use Cases)
// Schema reset, ingestion, translation, publishing, pipeline orchestration.
pub mod application;

pub mod error;

// --- RE-EXPORTS (FACADE) ---
pub use error::LakeseedError;
