// lakeseed-core/src/domain/semantic/payload.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::domain::semantic::definition::{ColumnDoc, SecurityMode, SemanticKind};

/// Fully-qualified `catalog.schema.name` of a published object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QualifiedName {
    #[serde(rename = "catalogName")]
    pub catalog: String,
    #[serde(rename = "schemaName")]
    pub schema: String,
    pub name: String,
}

impl QualifiedName {
    pub fn new(catalog: &str, schema: &str, name: &str) -> Self {
        Self {
            catalog: catalog.to_string(),
            schema: schema.to_string(),
            name: name.to_string(),
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.catalog, self.schema, self.name)
    }
}

/// The resolved, normalized body sent to the catalog API. Never mutated once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentPayload {
    pub kind: SemanticKind,
    #[serde(flatten)]
    pub target: QualifiedName,
    pub definition_query: String,
    pub description: String,
    pub columns: Vec<ColumnDoc>,
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_security_mode: Option<SecurityMode>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub definition_properties: BTreeMap<String, String>,
    pub marked_for_deletion: bool,
}
