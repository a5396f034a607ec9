use crate::error::CatalogError;
use crate::model::{Category, FileEntry, ItemIndex, VersionIndex};
use anyhow::{Context, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

/// URL prefix that downloads are served under; mirrors the `down/` directory.
pub const DOWNLOAD_PREFIX: &str = "down";
const API_DIR: &str = "api";

/// File-based publish tree.
///
/// ```text
/// <root>/down/<category>/<item>/<version>/<file>
/// <root>/api/<category>.json
/// ```
#[derive(Debug, Clone)]
pub struct CatalogStorage {
    root: PathBuf,
}

impl CatalogStorage {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Wipe the publish tree and recreate its empty skeleton.
    pub async fn reset(&self) -> Result<()> {
        match fs::remove_dir_all(&self.root).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to remove {}", self.root.display()));
            }
        }
        fs::create_dir_all(self.down_dir())
            .await
            .with_context(|| format!("Failed to create {}", self.down_dir().display()))?;
        fs::create_dir_all(self.api_dir())
            .await
            .with_context(|| format!("Failed to create {}", self.api_dir().display()))?;
        Ok(())
    }

    pub fn down_dir(&self) -> PathBuf {
        self.root.join(DOWNLOAD_PREFIX)
    }

    pub fn api_dir(&self) -> PathBuf {
        self.root.join(API_DIR)
    }

    pub fn index_path(&self, category: Category) -> PathBuf {
        self.api_dir().join(format!("{}.json", category))
    }

    /// Load a category index. `Ok(None)` means the category was never built.
    pub async fn load_index(&self, category: Category) -> Result<Option<Vec<ItemIndex>>> {
        let path = self.index_path(category);
        let data = match fs::read_to_string(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
        };
        let items = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(Some(items))
    }

    pub async fn save_index(&self, category: Category, items: &[ItemIndex]) -> Result<()> {
        let path = self.index_path(category);
        let json = serde_json::to_string_pretty(items)?;
        fs::write(&path, json)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn item_dir(&self, category: Category, item: &str) -> PathBuf {
        self.down_dir().join(category.as_str()).join(item)
    }

    pub fn version_dir(&self, category: Category, item: &str, version: &str) -> PathBuf {
        self.item_dir(category, item).join(version)
    }

    /// Public URL of a published file.
    pub fn download_url(category: Category, item: &str, version: &str, file: &str) -> String {
        format!(
            "/{}/{}/{}/{}/{}",
            DOWNLOAD_PREFIX, category, item, version, file
        )
    }

    /// Path of a published file, or `None` when any segment could escape
    /// the publish tree.
    pub fn published_file(
        &self,
        category: Category,
        item: &str,
        version: &str,
        file: &str,
    ) -> Option<PathBuf> {
        if [item, version, file].iter().all(|s| is_safe_segment(s)) {
            Some(self.version_dir(category, item, version).join(file))
        } else {
            None
        }
    }

    /// Stat every indexed file of a version against the publish tree.
    ///
    /// Files missing on disk are dropped; sizes come from the current file,
    /// never from the index.
    pub async fn stat_files(
        &self,
        category: Category,
        item: &str,
        version: &VersionIndex,
    ) -> Result<Vec<FileEntry>, CatalogError> {
        let mut entries = Vec::with_capacity(version.files.len());
        for name in &version.files {
            let Some(path) = self.published_file(category, item, &version.version, name) else {
                continue;
            };
            match fs::metadata(&path).await {
                Ok(meta) if meta.is_file() => entries.push(FileEntry {
                    name: name.clone(),
                    download_url: Self::download_url(category, item, &version.version, name),
                    size: meta.len(),
                }),
                Ok(_) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(source) => {
                    return Err(CatalogError::Io {
                        context: format!(
                            "Failed to load version {} of {}",
                            version.version, item
                        ),
                        source,
                    });
                }
            }
        }
        Ok(entries)
    }
}

/// A single path segment that stays inside its parent directory.
pub fn is_safe_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(['/', '\\', '\0'])
}
