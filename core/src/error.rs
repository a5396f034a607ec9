use crate::model::Category;
use thiserror::Error;

/// Failures surfaced by catalog lookups on the serving side.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{item} not found in {category}")]
    ItemNotFound { category: Category, item: String },

    #[error("Version {version} not found for {item}")]
    VersionNotFound { item: String, version: String },

    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}
