// lakeseed-core/src/application/mod.rs

pub mod clean;
pub mod engine;
pub mod ingestion;
pub mod pipeline;
pub mod publish;
pub mod retry;
pub mod schema;
pub mod translation;

// --- RE-EXPORTS (FACADE PATTERN) ---
// `use lakeseed_core::application::{run_pipeline, publish, translate};`

pub use clean::clean_project;
pub use engine::execute_statement;
pub use ingestion::{IngestOptions, ingest_all};
pub use pipeline::{
    PipelineInputs, PipelineOptions, deploy_definitions, prepare, reset_with, run_pipeline,
};
pub use publish::publish;
pub use retry::{RetryPolicy, RetryingCatalogApi};
pub use schema::reset_namespace;
pub use translation::{translate, translate_one};
