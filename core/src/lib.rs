//! Core library for the asset catalog.
//!
//! Scans a `category/item/version/file` source tree, publishes it into a
//! deployable tree with one JSON index per category, and provides the
//! read-side lookups the HTTP server needs.

pub mod builder;
pub mod config;
pub mod error;
pub mod metadata;
pub mod model;
pub mod scanner;
pub mod snapshot;
pub mod storage;

pub use builder::{BuildReport, IndexBuilder};
pub use config::CatalogConfig;
pub use error::CatalogError;
pub use model::{Category, FileEntry, ItemIndex, VersionIndex};
pub use snapshot::CatalogSnapshot;
pub use storage::CatalogStorage;
