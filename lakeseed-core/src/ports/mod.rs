// lakeseed-core/src/ports/mod.rs

pub mod catalog_api;
pub mod connector;

pub use catalog_api::{CatalogApi, RemoteObject};
pub use connector::{ConnectionFactory, Connector};
