// lakeseed-core/src/application/clean.rs

use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::LakeseedError;
use crate::infrastructure::config::project::load_project_config;

/// Removes the configured `clean-targets`. Paths that would escape the
/// project directory are refused.
pub fn clean_project(project_dir: &Path) -> Result<Vec<String>, LakeseedError> {
    info!("Cleaning project artifacts");

    let config = load_project_config(project_dir)?;
    let targets = if config.clean_targets.is_empty() {
        vec![config.target_path.clone()]
    } else {
        config.clean_targets
    };

    let root = project_dir.canonicalize()?;
    let mut removed = Vec::new();
    for target_rel_path in targets {
        let relative = Path::new(&target_rel_path);
        if relative.is_absolute()
            || relative
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Err(LakeseedError::UnsafePath(target_rel_path));
        }

        let full_path = root.join(relative);
        if !full_path.starts_with(&root) || full_path == root {
            return Err(LakeseedError::UnsafePath(target_rel_path));
        }

        if full_path.is_dir() {
            fs::remove_dir_all(&full_path)?;
            removed.push(target_rel_path);
        } else if full_path.exists() {
            fs::remove_file(&full_path)?;
            removed.push(target_rel_path);
        }
    }

    Ok(removed)
}
