// lakeseed-core/src/infrastructure/adapters/catalog_http.rs

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::domain::config::{ConnectionSettings, EffectiveConfig};
use crate::domain::semantic::{DeploymentPayload, QualifiedName};
use crate::error::LakeseedError;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::catalog_api::{CatalogApi, RemoteObject};

const OBJECTS_PATH: &str = "/api/v1/semantic/objects";

/// JSON client for the remote semantic-layer service.
pub struct HttpCatalogApi {
    client: Client,
    base_url: String,
    user: Option<String>,
    password: Option<String>,
}

impl HttpCatalogApi {
    pub fn new(
        base_url: &str,
        user: Option<String>,
        password: Option<String>,
    ) -> Result<Self, InfrastructureError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            user,
            password,
        })
    }

    pub fn from_config(config: &EffectiveConfig) -> Result<Self, LakeseedError> {
        let connection = ConnectionSettings::from_config(config)?;
        let base_url = connection.catalog_api_url(config);
        Ok(Self::new(&base_url, connection.user, connection.password)?)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn object_url(&self, name: &QualifiedName) -> String {
        format!("{}{}/{}", self.base_url, OBJECTS_PATH, name)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.user {
            Some(user) => request.basic_auth(user, self.password.as_ref()),
            None => request,
        }
    }

    async fn into_object(response: Response) -> Result<RemoteObject, InfrastructureError> {
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(Self::api_error(response).await)
        }
    }

    async fn api_error(response: Response) -> InfrastructureError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        InfrastructureError::Api { status, body }
    }
}

#[async_trait]
impl CatalogApi for HttpCatalogApi {
    #[instrument(skip(self), fields(target = %name))]
    async fn get_semantic_object(
        &self,
        name: &QualifiedName,
    ) -> Result<Option<RemoteObject>, LakeseedError> {
        let response = self
            .authorize(self.client.get(self.object_url(name)))
            .send()
            .await
            .map_err(InfrastructureError::Http)?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("Not found");
            return Ok(None);
        }
        Ok(Some(Self::into_object(response).await?))
    }

    #[instrument(skip(self, payload), fields(target = %payload.target))]
    async fn create_semantic_object(
        &self,
        payload: &DeploymentPayload,
    ) -> Result<RemoteObject, LakeseedError> {
        let url = format!("{}{}", self.base_url, OBJECTS_PATH);
        let response = self
            .authorize(self.client.post(url).json(payload))
            .send()
            .await
            .map_err(InfrastructureError::Http)?;
        Ok(Self::into_object(response).await?)
    }

    #[instrument(skip(self, existing, payload), fields(target = %payload.target, id = %existing.id))]
    async fn update_semantic_object(
        &self,
        existing: &RemoteObject,
        payload: &DeploymentPayload,
    ) -> Result<RemoteObject, LakeseedError> {
        let response = self
            .authorize(self.client.put(self.object_url(&payload.target)).json(payload))
            .send()
            .await
            .map_err(InfrastructureError::Http)?;
        Ok(Self::into_object(response).await?)
    }
}
