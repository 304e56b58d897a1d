// lakeseed-core/src/domain/semantic/definition.rs

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SemanticKind {
    #[serde(rename = "VIEW", alias = "view", alias = "View")]
    View,
    #[serde(
        rename = "MATERIALIZED_VIEW",
        alias = "materialized_view",
        alias = "MaterializedView"
    )]
    MaterializedView,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SecurityMode {
    #[default]
    Definer,
    Invoker,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ColumnDoc {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Kind-specific knobs. Which ones are legal depends on the kind; the
/// translator enforces that.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DefinitionMetadata {
    // --- Materialized views ---
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_interval: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_import_duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incremental_column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grace_period: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_refresh_limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_schedule_timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_location: Option<String>,

    // --- Views ---
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_mode: Option<SecurityMode>,

    // --- Both ---
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl DefinitionMetadata {
    /// Names of the materialized-view-only fields that are set.
    pub fn materialized_fields_set(&self) -> Vec<&'static str> {
        let mut set = Vec::new();
        if self.refresh_interval.is_some() {
            set.push("refresh_interval");
        }
        if self.max_import_duration.is_some() {
            set.push("max_import_duration");
        }
        if self.incremental_column.is_some() {
            set.push("incremental_column");
        }
        if self.grace_period.is_some() {
            set.push("grace_period");
        }
        if self.failed_refresh_limit.is_some() {
            set.push("failed_refresh_limit");
        }
        if self.refresh_schedule_timezone.is_some() {
            set.push("refresh_schedule_timezone");
        }
        if self.storage_location.is_some() {
            set.push("storage_location");
        }
        set
    }
}

/// One published object, as declared. Placeholders are still unresolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticDefinition {
    pub kind: SemanticKind,
    pub name: String,
    /// `catalog.schema`, usually built from `${...}` placeholders.
    pub namespace: String,
    pub query: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub columns: Vec<ColumnDoc>,
    #[serde(flatten)]
    pub metadata: DefinitionMetadata,
    /// Where the definition was read from (file path), for reporting.
    #[serde(skip)]
    pub origin: Option<String>,
    /// Keys in the source entry that match no known field.
    #[serde(skip)]
    pub unknown_keys: Vec<String>,
}

impl SemanticDefinition {
    pub fn view(name: &str, namespace: &str, query: &str) -> Self {
        Self {
            kind: SemanticKind::View,
            name: name.to_string(),
            namespace: namespace.to_string(),
            query: query.to_string(),
            description: String::new(),
            columns: Vec::new(),
            metadata: DefinitionMetadata::default(),
            origin: None,
            unknown_keys: Vec::new(),
        }
    }

    pub fn materialized_view(
        name: &str,
        namespace: &str,
        query: &str,
        refresh_interval: &str,
    ) -> Self {
        Self {
            kind: SemanticKind::MaterializedView,
            metadata: DefinitionMetadata {
                refresh_interval: Some(refresh_interval.to_string()),
                ..Default::default()
            },
            ..Self::view(name, namespace, query)
        }
    }

    /// Label used in reports before the target name is resolved.
    pub fn label(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }
}
