// lakeseed-core/src/infrastructure/adapters/trino.rs

// Trino client protocol: POST the statement, then follow `nextUri` until the
// coordinator stops handing one out.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::domain::config::{ConnectionSettings, EffectiveConfig, keys};
use crate::domain::error::ConfigError;
use crate::domain::sql::Dialect;
use crate::error::LakeseedError;
use crate::infrastructure::error::{DatabaseError, InfrastructureError};
use crate::ports::connector::{ConnectionFactory, Connector};

const SOURCE: &str = "lakeseed";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
pub struct TrinoSettings {
    pub base_url: String,
    pub user: String,
    pub password: Option<String>,
    pub catalog: Option<String>,
}

impl TrinoSettings {
    pub fn from_config(config: &EffectiveConfig) -> Result<Self, ConfigError> {
        let connection = ConnectionSettings::from_config(config)?;
        let user = connection
            .user
            .clone()
            .ok_or_else(|| ConfigError::Missing(vec![keys::USER.to_string()]))?;
        Ok(Self {
            base_url: connection.base_url(),
            user,
            password: connection.password,
            catalog: config.get(keys::CATALOG).map(str::to_string),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryResults {
    id: String,
    #[serde(default)]
    next_uri: Option<String>,
    #[serde(default)]
    error: Option<QueryError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryError {
    message: String,
    #[serde(default)]
    error_name: String,
}

pub struct TrinoConnector {
    client: Client,
    settings: TrinoSettings,
}

impl TrinoConnector {
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request
            .header("X-Trino-User", &self.settings.user)
            .header("X-Trino-Source", SOURCE);
        let request = match &self.settings.catalog {
            Some(catalog) => request.header("X-Trino-Catalog", catalog),
            None => request,
        };
        match &self.settings.password {
            Some(password) => request.basic_auth(&self.settings.user, Some(password)),
            None => request,
        }
    }

    async fn fetch(&self, request: RequestBuilder) -> Result<QueryResults, InfrastructureError> {
        let response = self.authorize(request).send().await?;
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            Err(InfrastructureError::Api { status, body })
        }
    }
}

#[async_trait]
impl Connector for TrinoConnector {
    #[instrument(skip(self, sql), fields(sql.len = sql.len()))]
    async fn execute(&self, sql: &str) -> Result<(), LakeseedError> {
        let url = format!("{}/v1/statement", self.settings.base_url);
        let mut results = self
            .fetch(self.client.post(&url).body(sql.to_string()))
            .await?;
        debug!(query_id = %results.id, "Statement submitted");

        loop {
            if let Some(error) = results.error {
                return Err(LakeseedError::Infrastructure(InfrastructureError::Database(
                    DatabaseError::Trino {
                        error_name: error.error_name,
                        message: error.message,
                    },
                )));
            }
            match results.next_uri {
                Some(next) => results = self.fetch(self.client.get(&next)).await?,
                None => return Ok(()),
            }
        }
    }

    fn dialect(&self) -> Dialect {
        Dialect::Trino
    }

    async fn close(self: Box<Self>) -> Result<(), LakeseedError> {
        Ok(())
    }
}

/// One HTTP client per session; nothing is shared between tables.
pub struct TrinoConnectionFactory {
    settings: TrinoSettings,
}

impl TrinoConnectionFactory {
    pub fn new(settings: TrinoSettings) -> Self {
        Self { settings }
    }

    pub fn from_config(config: &EffectiveConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(TrinoSettings::from_config(config)?))
    }
}

#[async_trait]
impl ConnectionFactory for TrinoConnectionFactory {
    async fn connect(&self) -> Result<Box<dyn Connector>, LakeseedError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(InfrastructureError::Http)?;
        Ok(Box::new(TrinoConnector {
            client,
            settings: self.settings.clone(),
        }))
    }
}
