// lakeseed-core/src/infrastructure/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DatabaseError {
    #[error("DuckDB Engine Error: {0}")]
    #[diagnostic(
        code(lakeseed::infra::database::duckdb),
        help("An error occurred inside the local SQL engine.")
    )]
    DuckDB(#[from] duckdb::Error),

    #[error("Trino query failed ({error_name}): {message}")]
    #[diagnostic(
        code(lakeseed::infra::database::trino),
        help("The statement was rejected by the remote coordinator.")
    )]
    Trino { error_name: String, message: String },
}

#[derive(Error, Debug, Diagnostic)]
pub enum InfrastructureError {
    // --- DATABASE (Abstracted) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Database(#[from] DatabaseError),

    #[error("Connection lock poisoned: {0}")]
    #[diagnostic(code(lakeseed::infra::poisoned))]
    Poisoned(String),

    // --- HTTP ---
    #[error("HTTP transport error: {0}")]
    #[diagnostic(
        code(lakeseed::infra::http),
        help("Check HOST/PORT/HTTP_SCHEME and that the service is reachable.")
    )]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {body}")]
    #[diagnostic(code(lakeseed::infra::api))]
    Api { status: u16, body: String },

    // --- FILESYSTEM (IO) ---
    #[error("File System Error: {0}")]
    #[diagnostic(
        code(lakeseed::infra::io),
        help("Check file permissions or path validity.")
    )]
    Io(#[from] std::io::Error),

    // --- CONFIG / YAML / CSV ---
    #[error("YAML Parsing Error: {0}")]
    #[diagnostic(
        code(lakeseed::infra::yaml),
        help("Check your YAML syntax (indentation, types).")
    )]
    YamlError(#[from] serde_yaml::Error),

    #[error("CSV Parsing Error: {0}")]
    #[diagnostic(code(lakeseed::infra::csv))]
    CsvError(#[from] csv::Error),

    #[error("Configuration Error: {0}")]
    #[diagnostic(code(lakeseed::infra::config))]
    ConfigError(String),

    #[error("Project configuration not found at '{0}'")]
    #[diagnostic(code(lakeseed::infra::config_missing))]
    ConfigNotFound(String),
}

impl InfrastructureError {
    pub fn is_transient(&self) -> bool {
        match self {
            InfrastructureError::Http(e) => e.is_timeout() || e.is_connect(),
            InfrastructureError::Api { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

// Shortcut for `?` on duckdb calls
impl From<duckdb::Error> for InfrastructureError {
    fn from(err: duckdb::Error) -> Self {
        InfrastructureError::Database(DatabaseError::DuckDB(err))
    }
}
