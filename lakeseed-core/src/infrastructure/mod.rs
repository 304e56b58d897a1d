// lakeseed-core/src/infrastructure/mod.rs

pub mod adapters;
pub mod batches;
pub mod config;
pub mod error;
pub mod fs;
