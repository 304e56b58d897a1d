// lakeseed-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum ConfigError {
    #[error("Missing required configuration: {}", .0.join(", "))]
    #[diagnostic(
        code(lakeseed::domain::config::missing),
        help("Set the keys in the global settings.yaml or in the domain settings.yaml.")
    )]
    Missing(Vec<String>),

    #[error("Invalid value for '{key}': {reason}")]
    #[diagnostic(code(lakeseed::domain::config::invalid))]
    Invalid { key: String, reason: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum TranslationError {
    #[error("Definition '{definition}' references unresolved placeholder ${{{key}}}")]
    #[diagnostic(
        code(lakeseed::domain::translation::placeholder),
        help("Add '{key}' to the global or domain settings.")
    )]
    UnresolvedPlaceholder { definition: String, key: String },

    #[error("Definition '{definition}' is malformed: {reason}")]
    #[diagnostic(code(lakeseed::domain::translation::malformed))]
    Malformed { definition: String, reason: String },

    #[error("Materialized view '{0}' must declare a refresh_interval")]
    #[diagnostic(code(lakeseed::domain::translation::refresh_missing))]
    MissingRefreshInterval(String),

    #[error("Definition '{definition}' declares '{field}', which its kind does not accept")]
    #[diagnostic(code(lakeseed::domain::translation::unexpected_metadata))]
    UnexpectedMetadata { definition: String, field: String },

    #[error("Definition '{definition}': invalid duration '{value}' (expected e.g. '30m', '4h', '2d')")]
    #[diagnostic(code(lakeseed::domain::translation::duration))]
    InvalidDuration { definition: String, value: String },

    #[error(
        "Materialized view '{definition}': refresh interval ({interval}) must be significantly longer than max import duration ({duration})"
    )]
    #[diagnostic(
        code(lakeseed::domain::translation::refresh_too_short),
        help("The interval must exceed the import duration by more than 10%.")
    )]
    RefreshIntervalTooShort {
        definition: String,
        interval: String,
        duration: String,
    },

    #[error("Target '{0}' is declared more than once in this deployment batch")]
    #[diagnostic(code(lakeseed::domain::translation::duplicate))]
    DuplicateTarget(String),
}
