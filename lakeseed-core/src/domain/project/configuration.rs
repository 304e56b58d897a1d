// lakeseed-core/src/domain/project/configuration.rs

use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

use crate::domain::sql::Dialect;

/// Engine used for both raw loading and the semantic layer.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    #[default]
    DuckDB,
    Trino,
}

impl Engine {
    pub fn dialect(self) -> Dialect {
        match self {
            Engine::DuckDB => Dialect::DuckDB,
            Engine::Trino => Dialect::Trino,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct ProjectConfig {
    pub name: String,

    #[serde(default)]
    pub engine: Engine,

    #[serde(rename = "domains-path", default = "default_domains_path")]
    pub domains_path: String,

    #[serde(rename = "target-path", default = "default_target_path")]
    pub target_path: String,

    #[serde(rename = "database-path", default = "default_database_path")]
    pub database_path: String,

    #[serde(rename = "clean-targets", default = "default_clean_targets")]
    pub clean_targets: Vec<String>,

    #[validate(nested)]
    #[serde(default)]
    pub ingestion: IngestionConfig,

    #[validate(nested)]
    #[serde(default)]
    pub retry: RetryConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct IngestionConfig {
    #[validate(range(min = 1, message = "max_concurrency must be at least 1"))]
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    #[validate(range(min = 1, message = "chunk_size must be at least 1"))]
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Publish definitions even when a table they read from failed to load.
    #[serde(default)]
    pub tolerate_partial: bool,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            chunk_size: default_chunk_size(),
            tolerate_partial: false,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct RetryConfig {
    #[validate(range(min = 1, message = "max_attempts must be at least 1"))]
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl RetryConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

pub const DEFAULT_MAX_CONCURRENCY: usize = 6;
pub const DEFAULT_CHUNK_SIZE: usize = 10_000;

fn default_max_concurrency() -> usize {
    DEFAULT_MAX_CONCURRENCY
}
fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}
fn default_max_attempts() -> u32 {
    3
}
fn default_base_delay_ms() -> u64 {
    100
}
fn default_max_delay_ms() -> u64 {
    5_000
}
fn default_domains_path() -> String {
    "domains".to_string()
}
fn default_target_path() -> String {
    "target".to_string()
}
fn default_database_path() -> String {
    "target/lakeseed.duckdb".to_string()
}
fn default_clean_targets() -> Vec<String> {
    vec!["target".to_string()]
}
