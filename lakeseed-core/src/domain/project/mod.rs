// lakeseed-core/src/domain/project/mod.rs

pub mod configuration;
pub use configuration::{Engine, IngestionConfig, ProjectConfig, RetryConfig};
