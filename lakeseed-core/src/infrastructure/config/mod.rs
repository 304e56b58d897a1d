// lakeseed-core/src/infrastructure/config/mod.rs

pub mod definitions;
pub mod project;
pub mod settings;

pub use crate::domain::project::ProjectConfig;
pub use definitions::{LoadedDefinitions, load_definitions};
pub use project::load_project_config;
pub use settings::{SETTINGS_FILE, load_option_set};
