// lakeseed-core/src/ports/catalog_api.rs

// The remote semantic-layer service. Lookup is by fully-qualified name;
// writes carry the whole payload.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::semantic::{DeploymentPayload, QualifiedName};
use crate::error::LakeseedError;

/// What the catalog hands back for an existing object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteObject {
    pub id: String,
}

#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn get_semantic_object(
        &self,
        name: &QualifiedName,
    ) -> Result<Option<RemoteObject>, LakeseedError>;

    async fn create_semantic_object(
        &self,
        payload: &DeploymentPayload,
    ) -> Result<RemoteObject, LakeseedError>;

    async fn update_semantic_object(
        &self,
        existing: &RemoteObject,
        payload: &DeploymentPayload,
    ) -> Result<RemoteObject, LakeseedError>;
}
