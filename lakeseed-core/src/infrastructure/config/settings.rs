// lakeseed-core/src/infrastructure/config/settings.rs

// Flat KEY: value files. Scalars become strings; anything nested is refused.

use serde_yaml::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::domain::config::OptionSet;
use crate::infrastructure::error::InfrastructureError;

pub const SETTINGS_FILE: &str = "settings.yaml";

/// A missing file is an empty set, not an error.
pub fn load_option_set(path: &Path) -> Result<OptionSet, InfrastructureError> {
    if !path.exists() {
        warn!(path = ?path, "Settings file not found, using an empty option set");
        return Ok(OptionSet::new());
    }

    let content = fs::read_to_string(path)?;
    let set = parse_option_set(&content)
        .map_err(|reason| InfrastructureError::ConfigError(format!("{}: {}", path.display(), reason)))?;
    debug!(path = ?path, keys = set.len(), "Settings loaded");
    Ok(set)
}

pub fn parse_option_set(content: &str) -> Result<OptionSet, String> {
    let doc: Value = serde_yaml::from_str(content).map_err(|e| e.to_string())?;
    let mapping = match doc {
        Value::Null => return Ok(OptionSet::new()),
        Value::Mapping(m) => m,
        _ => return Err("expected a mapping of KEY: value".to_string()),
    };

    let mut set = OptionSet::new();
    for (key, value) in mapping {
        let key = scalar_to_string(&key).ok_or("keys must be scalars")?;
        let value = match value {
            Value::Null => String::new(),
            other => scalar_to_string(&other)
                .ok_or_else(|| format!("value of '{}' must be a scalar", key))?,
        };
        set.insert(key, value);
    }
    Ok(set)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
