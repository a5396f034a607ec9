//! One-level directory listings for the `category/item/version/file` tree.
//!
//! Every listing is sorted by name. A missing directory lists as empty.

use crate::metadata::is_version_sidecar;
use anyhow::{Context, Result};
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;
use tracing::warn;

#[derive(Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    Dir,
    File,
}

/// Item directories directly under a category directory.
pub async fn list_items(category_dir: &Path) -> Result<Vec<String>> {
    list_entries(category_dir, EntryKind::Dir).await
}

/// Version directories directly under an item directory.
pub async fn list_versions(item_dir: &Path) -> Result<Vec<String>> {
    list_entries(item_dir, EntryKind::Dir).await
}

/// Downloadable files in a version directory; sidecar metadata is excluded.
pub async fn list_files(version_dir: &Path) -> Result<Vec<String>> {
    let mut files = list_entries(version_dir, EntryKind::File).await?;
    files.retain(|name| !is_version_sidecar(name));
    Ok(files)
}

async fn list_entries(dir: &Path, kind: EntryKind) -> Result<Vec<String>> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to list {}", dir.display()));
        }
    };

    let mut names = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .with_context(|| format!("Failed to list {}", dir.display()))?
    {
        let path = entry.path();
        // Follows symlinks so linked assets are published like regular ones.
        let meta = match fs::metadata(&path).await {
            Ok(meta) => meta,
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };
        let matches = match kind {
            EntryKind::Dir => meta.is_dir(),
            EntryKind::File => meta.is_file(),
        };
        if !matches {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(raw) => warn!("Skipping non UTF-8 entry {:?} in {}", raw, dir.display()),
        }
    }

    names.sort();
    Ok(names)
}
