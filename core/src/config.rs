//! Process configuration shared by the build and serve binaries.
//!
//! Sources, highest priority first: positional arguments (applied by the
//! binaries), environment variables, defaults.

use std::path::PathBuf;

pub const SOURCE_DIR_VAR: &str = "CATALOG_SOURCE_DIR";
pub const PUBLISH_DIR_VAR: &str = "CATALOG_PUBLISH_DIR";
pub const PORT_VAR: &str = "PORT";

const DEFAULT_SOURCE_DIR: &str = "public";
const DEFAULT_PUBLISH_DIR: &str = "publish";
const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Authoritative `category/item/version` tree.
    pub source_root: PathBuf,
    /// Deployable tree written by the builder and read by the server.
    pub publish_root: PathBuf,
    pub port: u16,
}

impl CatalogConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let source_root = lookup(SOURCE_DIR_VAR)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCE_DIR));

        let publish_root = lookup(PUBLISH_DIR_VAR)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PUBLISH_DIR));

        let port = lookup(PORT_VAR)
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        Self {
            source_root,
            publish_root,
            port,
        }
    }
}
