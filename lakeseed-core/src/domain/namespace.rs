// lakeseed-core/src/domain/namespace.rs

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::config::{EffectiveConfig, keys};
use crate::domain::error::ConfigError;

/// The (catalog, schema, storage-location) triple that one run owns exclusively.
/// Two runs must never target the same namespace at the same time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawNamespace {
    pub catalog: Option<String>,
    pub schema: String,
    pub location: String,
}

impl RawNamespace {
    pub fn new(catalog: Option<&str>, schema: &str, location: &str) -> Self {
        Self {
            catalog: catalog.map(str::to_string),
            schema: schema.to_string(),
            location: location.to_string(),
        }
    }

    /// `SCHEMA_LOCATION` wins; otherwise `SCHEMA_LOCATION_BASE` + schema + "/".
    pub fn from_config(config: &EffectiveConfig) -> Result<Self, ConfigError> {
        let schema = config.require(keys::SCHEMA)?.trim().to_string();
        if schema.contains('.') {
            return Err(ConfigError::Invalid {
                key: keys::SCHEMA.to_string(),
                reason: format!("'{}' must be a bare schema name", schema),
            });
        }

        let location = match config.get(keys::SCHEMA_LOCATION) {
            Some(explicit) => explicit.trim().to_string(),
            None => {
                let base = config.require(keys::SCHEMA_LOCATION_BASE)?.trim();
                let sep = if base.ends_with('/') { "" } else { "/" };
                format!("{}{}{}/", base, sep, schema)
            }
        };

        Ok(Self {
            catalog: config.get(keys::CATALOG).map(|c| c.trim().to_string()),
            schema,
            location,
        })
    }
}

impl fmt::Display for RawNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.catalog {
            Some(catalog) => write!(f, "{}.{}", catalog, self.schema),
            None => write!(f, "{}", self.schema),
        }
    }
}

/// Double-quotes an identifier, doubling embedded quotes.
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Single-quotes a string literal, doubling embedded quotes.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
