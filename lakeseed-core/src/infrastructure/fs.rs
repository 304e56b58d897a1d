// lakeseed-core/src/infrastructure/fs.rs

use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::infrastructure::error::InfrastructureError;

/// Writes through a temp file in the target's directory, then renames it into
/// place. Readers see either the old content or the new, never a partial file.
pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(
    path: P,
    content: C,
) -> Result<(), InfrastructureError> {
    let path = path.as_ref();
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent)?;

    let mut temp_file = tempfile::NamedTempFile::new_in(parent)?;
    temp_file.write_all(content.as_ref())?;
    temp_file
        .persist(path)
        .map_err(|e| InfrastructureError::Io(e.error))?;

    Ok(())
}

/// Pretty JSON artifact (run report, payload dump).
pub fn write_json<P: AsRef<Path>, T: Serialize>(
    path: P,
    value: &T,
) -> Result<(), InfrastructureError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| InfrastructureError::ConfigError(format!("JSON serialization failed: {}", e)))?;
    atomic_write(path, json)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_atomic_write_overwrites_existing() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("run_results.json");

        atomic_write(&file_path, "first")?;
        atomic_write(&file_path, "second")?;

        assert_eq!(fs::read_to_string(file_path)?, "second");
        Ok(())
    }

    #[test]
    fn test_write_json_creates_missing_directories() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("target/nested/payloads.json");

        write_json(&file_path, &vec!["a", "b"])?;

        let back: Vec<String> = serde_json::from_str(&fs::read_to_string(file_path)?)?;
        assert_eq!(back, vec!["a", "b"]);
        Ok(())
    }
}
