// lakeseed-core/src/domain/config.rs

// Two-level option resolution: a global set overlaid by a domain set.
// The EffectiveConfig is built once per run and handed explicitly to every stage.

use serde::Serialize;
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::domain::error::ConfigError;

/// Raw option set as read from one settings file.
pub type OptionSet = BTreeMap<String, String>;

/// Well-known option names.
pub mod keys {
    pub const HOST: &str = "HOST";
    pub const PORT: &str = "PORT";
    pub const USER: &str = "USER";
    pub const PASSWORD: &str = "PASSWORD";
    pub const HTTP_SCHEME: &str = "HTTP_SCHEME";
    pub const CATALOG: &str = "CATALOG";
    pub const SCHEMA: &str = "SCHEMA";
    pub const SCHEMA_LOCATION: &str = "SCHEMA_LOCATION";
    pub const SCHEMA_LOCATION_BASE: &str = "SCHEMA_LOCATION_BASE";
    pub const SEMANTIC_CATALOG: &str = "SEMANTIC_CATALOG";
    pub const SEMANTIC_SCHEMA: &str = "SEMANTIC_SCHEMA";
    pub const CATALOG_API_URL: &str = "CATALOG_API_URL";
}

/// Keys every pipeline run needs before touching the remote side.
pub const PIPELINE_REQUIRED_KEYS: [&str; 4] = [
    keys::HOST,
    keys::PORT,
    keys::SCHEMA,
    keys::SCHEMA_LOCATION_BASE,
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EffectiveConfig {
    values: BTreeMap<String, String>,
}

/// Merge `domain` over `global`, then check that every `required` key resolved
/// to a non-empty value. All missing keys are reported at once.
pub fn resolve(
    global: &OptionSet,
    domain: &OptionSet,
    required: &[&str],
) -> Result<EffectiveConfig, ConfigError> {
    let config = EffectiveConfig::merge(global, domain);
    config.ensure_present(required)?;
    Ok(config)
}

impl EffectiveConfig {
    /// Overlay without validation. Domain entries win on conflict.
    pub fn merge(global: &OptionSet, domain: &OptionSet) -> Self {
        let mut values = global.clone();
        values.extend(domain.iter().map(|(k, v)| (k.clone(), v.clone())));
        Self { values }
    }

    /// Returns the value when present and non-empty.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    pub fn require(&self, key: &str) -> Result<&str, ConfigError> {
        self.get(key)
            .ok_or_else(|| ConfigError::Missing(vec![key.to_string()]))
    }

    pub fn ensure_present(&self, required: &[&str]) -> Result<(), ConfigError> {
        let missing: Vec<String> = required
            .iter()
            .filter(|k| self.get(k).is_none())
            .map(|k| k.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Missing(missing))
        }
    }

    /// Typed lookup. `Ok(None)` when the key is unset.
    pub fn parse<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => raw
                .trim()
                .parse::<T>()
                .map(Some)
                .map_err(|e| ConfigError::Invalid {
                    key: key.to_string(),
                    reason: format!("'{}': {}", raw, e),
                }),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Connection parameters coerced from the effective configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub host: String,
    pub port: u16,
    pub scheme: String,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl ConnectionSettings {
    pub fn from_config(config: &EffectiveConfig) -> Result<Self, ConfigError> {
        let host = config.require(keys::HOST)?.trim().to_string();
        let port: u16 = config
            .parse(keys::PORT)?
            .ok_or_else(|| ConfigError::Missing(vec![keys::PORT.to_string()]))?;

        let scheme = match config.get(keys::HTTP_SCHEME) {
            Some(s) => {
                let s = s.trim().to_lowercase();
                if s != "http" && s != "https" {
                    return Err(ConfigError::Invalid {
                        key: keys::HTTP_SCHEME.to_string(),
                        reason: format!("'{}' is neither http nor https", s),
                    });
                }
                s
            }
            None if port == 443 => "https".to_string(),
            None => "http".to_string(),
        };

        Ok(Self {
            host,
            port,
            scheme,
            user: config.get(keys::USER).map(str::to_string),
            password: config.get(keys::PASSWORD).map(str::to_string),
        })
    }

    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }

    /// Base URL of the semantic-layer API. `CATALOG_API_URL` wins when set.
    pub fn catalog_api_url(&self, config: &EffectiveConfig) -> String {
        config
            .get(keys::CATALOG_API_URL)
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| self.base_url())
    }
}
