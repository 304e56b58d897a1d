// lakeseed/src/commands/clean.rs
//
// USE CASE: Clean build artifacts.

use std::path::PathBuf;

use lakeseed_core::application::clean_project;

pub fn execute(project_dir: PathBuf) -> anyhow::Result<()> {
    match clean_project(&project_dir) {
        Ok(removed) if removed.is_empty() => println!("🧹 Nothing to clean."),
        Ok(removed) => {
            for path in removed {
                println!("🧹 Removed {}", path);
            }
        }
        Err(e) => {
            eprintln!("❌ Clean failed: {}", e);
            std::process::exit(1);
        }
    }
    Ok(())
}
