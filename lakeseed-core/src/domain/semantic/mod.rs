// lakeseed-core/src/domain/semantic/mod.rs

pub mod definition;
pub mod duration;
pub mod payload;
pub mod placeholder;

pub use definition::{ColumnDoc, DefinitionMetadata, SecurityMode, SemanticDefinition, SemanticKind};
pub use payload::{DeploymentPayload, QualifiedName};
