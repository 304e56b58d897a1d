// lakeseed-core/src/infrastructure/config/definitions.rs

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::domain::report::DeploymentResult;
use crate::domain::semantic::{ColumnDoc, DefinitionMetadata, SemanticDefinition, SemanticKind};
use crate::infrastructure::error::InfrastructureError;

const SUPPORTED_EXTENSIONS: [&str; 2] = ["yaml", "yml"];

// --- FILE FORMAT ---

#[derive(Debug, Deserialize)]
struct DefinitionFile {
    #[serde(default)]
    catalog: Option<String>,
    #[serde(default)]
    schema: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    views: Vec<DefinitionEntry>,
    #[serde(default)]
    materialized_views: Vec<DefinitionEntry>,
    #[serde(default)]
    definitions: Vec<TypedEntry>,
}

#[derive(Debug, Deserialize)]
struct DefinitionEntry {
    name: String,
    #[serde(default)]
    namespace: Option<String>,
    query: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    columns: Vec<ColumnDoc>,
    #[serde(flatten)]
    metadata: DefinitionMetadata,
    // Must follow `metadata`: it receives whatever the struct fields left.
    #[serde(flatten)]
    extra: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Deserialize)]
struct TypedEntry {
    kind: SemanticKind,
    #[serde(flatten)]
    entry: DefinitionEntry,
}

/// Parsed definitions plus one failed result per unreadable file.
#[derive(Debug, Default)]
pub struct LoadedDefinitions {
    pub definitions: Vec<SemanticDefinition>,
    pub failures: Vec<DeploymentResult>,
}

/// Reads every YAML file under `dir` in file-name order. A broken file is
/// recorded and skipped; the others still load.
pub fn load_definitions(dir: &Path) -> Result<LoadedDefinitions, InfrastructureError> {
    let mut loaded = LoadedDefinitions::default();
    if !dir.exists() {
        warn!(path = ?dir, "No definitions directory");
        return Ok(loaded);
    }

    let walker = WalkDir::new(dir).follow_links(true).sort_by_file_name();
    for entry in walker {
        let entry = entry.map_err(|e| InfrastructureError::Io(e.into()))?;
        let path = entry.path();
        let supported = path
            .extension()
            .is_some_and(|ext| SUPPORTED_EXTENSIONS.iter().any(|s| ext == *s));
        if !entry.file_type().is_file() || !supported {
            continue;
        }

        let origin = path.display().to_string();
        match parse_file(&fs::read_to_string(path)?, &origin) {
            Ok(mut defs) => {
                debug!(file = %origin, count = defs.len(), "Definitions loaded");
                loaded.definitions.append(&mut defs);
            }
            Err(reason) => {
                warn!(file = %origin, error = %reason, "Definition file rejected");
                loaded.failures.push(DeploymentResult::failed(&origin, reason));
            }
        }
    }

    info!(
        definitions = loaded.definitions.len(),
        rejected_files = loaded.failures.len(),
        "Semantic definitions loaded"
    );
    Ok(loaded)
}

pub fn parse_file(content: &str, origin: &str) -> Result<Vec<SemanticDefinition>, String> {
    let file: DefinitionFile = serde_yaml::from_str(content).map_err(|e| e.to_string())?;

    let default_namespace = match (&file.catalog, &file.schema) {
        (Some(catalog), Some(schema)) => format!("{}.{}", catalog, schema),
        _ => String::new(),
    };

    let build = |kind: SemanticKind, entry: DefinitionEntry| {
        let mut metadata = entry.metadata;
        let mut tags = file.tags.clone();
        tags.append(&mut metadata.tags);
        metadata.tags = tags;

        SemanticDefinition {
            kind,
            name: entry.name,
            namespace: entry
                .namespace
                .unwrap_or_else(|| default_namespace.clone()),
            query: entry.query,
            description: entry.description,
            columns: entry.columns,
            metadata,
            origin: Some(origin.to_string()),
            unknown_keys: entry.extra.into_keys().collect(),
        }
    };

    let mut definitions = Vec::new();
    definitions.extend(
        file.views
            .into_iter()
            .map(|e| build(SemanticKind::View, e)),
    );
    definitions.extend(
        file.materialized_views
            .into_iter()
            .map(|e| build(SemanticKind::MaterializedView, e)),
    );
    definitions.extend(file.definitions.into_iter().map(|t| build(t.kind, t.entry)));
    Ok(definitions)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::semantic::SecurityMode;

    const FILE: &str = r#"
catalog: ${SEMANTIC_CATALOG}
schema: ${SEMANTIC_SCHEMA}
tags: [sales]
views:
  - name: orders_v
    query: SELECT * FROM ${SCHEMA}.orders
    security_mode: INVOKER
    tags: [pii]
    columns:
      - name: id
        description: Order id
materialized_views:
  - name: daily_revenue
    query: SELECT 1
    refresh_interval: 4h
    failed_refresh_limit: 3
definitions:
  - kind: VIEW
    name: other
    namespace: dp.marketing
    query: SELECT 2
"#;

    #[test]
    fn test_file_defaults_apply_to_entries() {
        let defs = parse_file(FILE, "sales.yaml").unwrap();
        assert_eq!(defs.len(), 3);

        let view = &defs[0];
        assert_eq!(view.kind, SemanticKind::View);
        assert_eq!(view.namespace, "${SEMANTIC_CATALOG}.${SEMANTIC_SCHEMA}");
        assert_eq!(view.metadata.tags, vec!["sales", "pii"]);
        assert_eq!(view.metadata.security_mode, Some(SecurityMode::Invoker));
        assert_eq!(view.columns[0].description, "Order id");
        assert_eq!(view.origin.as_deref(), Some("sales.yaml"));

        let mv = &defs[1];
        assert_eq!(mv.kind, SemanticKind::MaterializedView);
        assert_eq!(mv.metadata.refresh_interval.as_deref(), Some("4h"));
        assert_eq!(mv.metadata.failed_refresh_limit, Some(3));

        assert_eq!(defs[2].namespace, "dp.marketing");
        assert!(defs.iter().all(|d| d.unknown_keys.is_empty()));
    }

    #[test]
    fn test_misspelled_keys_are_kept_for_the_translator() {
        let content = r#"
materialized_views:
  - name: daily_revenue
    namespace: dp.sales
    query: SELECT 1
    refresh_intervall: 4h
definitions:
  - kind: VIEW
    name: other
    namespace: dp.sales
    query: SELECT 2
    security_mode: INVOKER
"#;
        let defs = parse_file(content, "typo.yaml").unwrap();

        assert_eq!(defs[0].unknown_keys, vec!["refresh_intervall"]);
        assert_eq!(defs[0].metadata.refresh_interval, None);
        assert!(defs[1].unknown_keys.is_empty());
        assert_eq!(defs[1].metadata.security_mode, Some(SecurityMode::Invoker));
    }

    #[test]
    fn test_broken_file_is_isolated() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a_good.yaml"), FILE).unwrap();
        fs::write(dir.path().join("b_broken.yaml"), "views: [ {name: x").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let loaded = load_definitions(dir.path()).unwrap();
        assert_eq!(loaded.definitions.len(), 3);
        assert_eq!(loaded.failures.len(), 1);
        assert!(loaded.failures[0].target.ends_with("b_broken.yaml"));
    }
}
