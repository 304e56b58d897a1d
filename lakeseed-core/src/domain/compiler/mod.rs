// lakeseed-core/src/domain/compiler/mod.rs

pub mod relations;
pub use relations::RelationScanner;
