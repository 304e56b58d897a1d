// lakeseed-core/src/error.rs

use crate::domain::error::{ConfigError, TranslationError};
use crate::infrastructure::error::InfrastructureError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LakeseedError {
    // --- PRE-FLIGHT (fatal) ---
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Schema reset failed for {namespace} while running `{statement}`: {reason}")]
    SchemaReset {
        namespace: String,
        statement: String,
        reason: String,
    },

    // --- PER-ITEM (captured into the run report) ---
    #[error("Ingestion of table '{table}' failed: {reason}")]
    Ingestion { table: String, reason: String },

    #[error(transparent)]
    Translation(#[from] TranslationError),

    #[error("Publishing '{target}' failed: {reason}")]
    Publish { target: String, reason: String },

    // --- ADAPTERS (DB, HTTP, IO, Parsing) ---
    #[error(transparent)]
    Infrastructure(#[from] InfrastructureError),

    #[error("Internal Error: {0}")]
    InternalError(String),

    #[error("Unsafe path traversal detected: {0}")]
    UnsafePath(String),
}

impl LakeseedError {
    /// Errors worth retrying: dropped connections, timeouts, 5xx and 429 answers.
    pub fn is_transient(&self) -> bool {
        match self {
            LakeseedError::Infrastructure(e) => e.is_transient(),
            _ => false,
        }
    }

    /// The remote side already holds an object under that name.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            LakeseedError::Infrastructure(InfrastructureError::Api { status: 409, .. })
        )
    }
}

impl From<std::io::Error> for LakeseedError {
    fn from(err: std::io::Error) -> Self {
        LakeseedError::Infrastructure(InfrastructureError::Io(err))
    }
}

impl From<duckdb::Error> for LakeseedError {
    fn from(err: duckdb::Error) -> Self {
        LakeseedError::Infrastructure(InfrastructureError::from(err))
    }
}
