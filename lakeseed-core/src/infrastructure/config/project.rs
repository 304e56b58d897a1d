// lakeseed-core/src/infrastructure/config/project.rs

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::domain::project::configuration::ProjectConfig;
use crate::infrastructure::error::InfrastructureError;

pub const PROJECT_FILES: [&str; 2] = ["lakeseed.yaml", "lakeseed.yml"];

#[instrument(skip(project_dir))]
pub fn load_project_config(project_dir: &Path) -> Result<ProjectConfig, InfrastructureError> {
    // 1. Locate
    let config_path = find_main_config(project_dir)?;
    info!(path = ?config_path, "Loading project config");

    // 2. Parse
    let content = fs::read_to_string(&config_path)?;
    let mut config: ProjectConfig = serde_yaml::from_str(&content)?;

    // 3. Environment layer (LAKESEED_TARGET_PATH=/tmp/out lakeseed run ...)
    apply_env_overrides(&mut config)?;

    // 4. Rules
    config
        .validate()
        .map_err(|e| InfrastructureError::ConfigError(e.to_string()))?;

    Ok(config)
}

fn find_main_config(root: &Path) -> Result<PathBuf, InfrastructureError> {
    PROJECT_FILES
        .iter()
        .map(|filename| root.join(filename))
        .find(|p| p.exists())
        .ok_or_else(|| {
            InfrastructureError::ConfigNotFound(format!(
                "{} (checked: {:?})",
                root.display(),
                PROJECT_FILES
            ))
        })
}

fn apply_env_overrides(config: &mut ProjectConfig) -> Result<(), InfrastructureError> {
    if let Ok(val) = std::env::var("LAKESEED_TARGET_PATH") {
        info!(old = ?config.target_path, new = ?val, "Overriding target path via ENV");
        config.target_path = val;
    }
    if let Ok(val) = std::env::var("LAKESEED_MAX_CONCURRENCY") {
        let parsed: usize = val.trim().parse().map_err(|_| {
            InfrastructureError::ConfigError(format!(
                "LAKESEED_MAX_CONCURRENCY must be a positive integer, got '{}'",
                val
            ))
        })?;
        warn!(
            old = config.ingestion.max_concurrency,
            new = parsed,
            "Overriding ingestion concurrency via ENV"
        );
        config.ingestion.max_concurrency = parsed;
    }
    Ok(())
}
