// lakeseed-core/src/domain/report.rs

// Per-item outcome records and the run-level report. Every table and every
// semantic definition ends up here, in input order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TableOutcome {
    Loaded { rows: u64 },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerTableResult {
    pub table: String,
    #[serde(flatten)]
    pub outcome: TableOutcome,
}

impl PerTableResult {
    pub fn loaded(table: &str, rows: u64) -> Self {
        Self {
            table: table.to_string(),
            outcome: TableOutcome::Loaded { rows },
        }
    }

    pub fn failed(table: &str, error: impl fmt::Display) -> Self {
        Self {
            table: table.to_string(),
            outcome: TableOutcome::Failed {
                error: error.to_string(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, TableOutcome::Loaded { .. })
    }

    pub fn rows(&self) -> Option<u64> {
        match self.outcome {
            TableOutcome::Loaded { rows } => Some(rows),
            TableOutcome::Failed { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestionReport {
    pub results: Vec<PerTableResult>,
}

impl IngestionReport {
    pub fn is_success(&self) -> bool {
        self.results.iter().all(PerTableResult::is_success)
    }

    pub fn failed_tables(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| !r.is_success())
            .map(|r| r.table.as_str())
            .collect()
    }

    pub fn get(&self, table: &str) -> Option<&PerTableResult> {
        self.results.iter().find(|r| r.table == table)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentStatus {
    Created,
    Updated,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentResult {
    pub target: String,
    pub status: DeploymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeploymentResult {
    pub fn created(target: &str, remote_id: &str) -> Self {
        Self {
            target: target.to_string(),
            status: DeploymentStatus::Created,
            remote_id: Some(remote_id.to_string()),
            error: None,
        }
    }

    pub fn updated(target: &str, remote_id: &str) -> Self {
        Self {
            target: target.to_string(),
            status: DeploymentStatus::Updated,
            remote_id: Some(remote_id.to_string()),
            error: None,
        }
    }

    pub fn failed(target: &str, error: impl fmt::Display) -> Self {
        Self {
            target: target.to_string(),
            status: DeploymentStatus::Failed,
            remote_id: None,
            error: Some(error.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status != DeploymentStatus::Failed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    FullySuccessful,
    PartiallySuccessful,
    Aborted,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RunStatus::FullySuccessful => "fully successful",
            RunStatus::PartiallySuccessful => "partially successful",
            RunStatus::Aborted => "aborted",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub tables: Vec<PerTableResult>,
    pub deployments: Vec<DeploymentResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aborted: Option<String>,
}

impl RunReport {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            finished_at: None,
            tables: Vec::new(),
            deployments: Vec::new(),
            aborted: None,
        }
    }

    /// A run stopped by a pre-flight error (config or schema reset).
    pub fn aborted(started_at: DateTime<Utc>, reason: impl fmt::Display) -> Self {
        Self {
            finished_at: Some(Utc::now()),
            aborted: Some(reason.to_string()),
            ..Self::new(started_at)
        }
    }

    pub fn finish(mut self) -> Self {
        self.finished_at = Some(Utc::now());
        self
    }

    pub fn status(&self) -> RunStatus {
        if self.aborted.is_some() {
            return RunStatus::Aborted;
        }
        let tables_ok = self.tables.iter().all(PerTableResult::is_success);
        let deployments_ok = self.deployments.iter().all(DeploymentResult::is_success);
        if tables_ok && deployments_ok {
            RunStatus::FullySuccessful
        } else {
            RunStatus::PartiallySuccessful
        }
    }

    /// JSON document with the computed status up front.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let mut doc = serde_json::to_value(self)?;
        if let Some(obj) = doc.as_object_mut() {
            obj.insert("status".to_string(), serde_json::to_value(self.status())?);
        }
        serde_json::to_string_pretty(&doc)
    }
}
