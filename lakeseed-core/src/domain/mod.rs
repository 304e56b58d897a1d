// lakeseed-core/src/domain/mod.rs

pub mod compiler;
pub mod config;
pub mod error;
pub mod namespace;
pub mod project;
pub mod report;
pub mod semantic;
pub mod sql;
pub mod table;

pub use config::{EffectiveConfig, OptionSet};
pub use error::{ConfigError, TranslationError};
pub use namespace::RawNamespace;
pub use report::{
    DeploymentResult, DeploymentStatus, IngestionReport, PerTableResult, RunReport, RunStatus,
};
