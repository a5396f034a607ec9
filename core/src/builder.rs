//! Offline index build: scan the source tree, copy assets into the publish
//! tree, and write one JSON index per category.

use crate::metadata::{self, ITEM_DESCRIPTION_FILE, VERSION_INFO_FILE};
use crate::model::{Category, ItemIndex, VersionIndex};
use crate::scanner;
use crate::storage::CatalogStorage;
use anyhow::{Context, Result};
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

/// Counters from one build run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub categories: usize,
    pub items: usize,
    pub versions: usize,
    pub files: usize,
    pub skipped_files: usize,
}

impl fmt::Display for BuildReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} categories, {} items, {} versions, {} files",
            self.categories, self.items, self.versions, self.files
        )?;
        if self.skipped_files > 0 {
            write!(f, " ({} skipped)", self.skipped_files)?;
        }
        Ok(())
    }
}

pub struct IndexBuilder {
    source_root: PathBuf,
    storage: CatalogStorage,
    categories: Vec<Category>,
}

impl IndexBuilder {
    pub fn new(source_root: PathBuf, publish_root: PathBuf) -> Self {
        Self {
            source_root,
            storage: CatalogStorage::new(publish_root),
            categories: Category::ALL.to_vec(),
        }
    }

    pub fn with_categories(mut self, categories: &[Category]) -> Self {
        self.categories = categories.to_vec();
        self
    }

    pub fn storage(&self) -> &CatalogStorage {
        &self.storage
    }

    /// Full destructive rebuild of the publish tree.
    ///
    /// Only failures that leave the publish tree unusable are returned:
    /// resetting the root and writing a category index. Anything scoped to
    /// one item, version or file is logged and skipped.
    pub async fn build(&self) -> Result<BuildReport> {
        info!(
            "Building catalog from {} into {}",
            self.source_root.display(),
            self.storage.root().display()
        );

        self.storage
            .reset()
            .await
            .context("Failed to reset publish directory")?;

        let mut report = BuildReport::default();
        for &category in &self.categories {
            let category_dir = self.source_root.join(category.as_str());
            if !is_dir(&category_dir).await {
                debug!("No {} directory, skipping", category);
                continue;
            }

            let items = self.build_category(category, &category_dir, &mut report).await;
            self.storage
                .save_index(category, &items)
                .await
                .with_context(|| format!("Failed to write {} index", category))?;
            info!("Indexed {}: {} items", category, items.len());
            report.categories += 1;
        }

        Ok(report)
    }

    async fn build_category(
        &self,
        category: Category,
        category_dir: &Path,
        report: &mut BuildReport,
    ) -> Vec<ItemIndex> {
        let names = match scanner::list_items(category_dir).await {
            Ok(names) => names,
            Err(e) => {
                warn!("Skipping {} items: {:#}", category, e);
                return Vec::new();
            }
        };

        let mut items = Vec::with_capacity(names.len());
        for name in names {
            match self.build_item(category, category_dir, &name, report).await {
                Ok(item) => items.push(item),
                Err(e) => warn!("Skipping {}/{}: {:#}", category, name, e),
            }
        }
        items
    }

    async fn build_item(
        &self,
        category: Category,
        category_dir: &Path,
        name: &str,
        report: &mut BuildReport,
    ) -> Result<ItemIndex> {
        let item_dir = category_dir.join(name);
        let labels = scanner::list_versions(&item_dir).await?;
        let description = metadata::read_item_description(&item_dir).await;

        let target_dir = self.storage.item_dir(category, name);
        fs::create_dir_all(&target_dir)
            .await
            .with_context(|| format!("Failed to create {}", target_dir.display()))?;
        copy_sidecar(
            &item_dir.join(ITEM_DESCRIPTION_FILE),
            &target_dir.join(ITEM_DESCRIPTION_FILE),
        )
        .await;

        let mut versions = Vec::with_capacity(labels.len());
        for label in labels {
            match self
                .build_version(category, &item_dir, name, &label, report)
                .await
            {
                Ok(version) => versions.push(version),
                Err(e) => warn!("Skipping {}/{}/{}: {:#}", category, name, label, e),
            }
        }

        report.items += 1;
        Ok(ItemIndex {
            name: name.to_string(),
            description,
            versions,
        })
    }

    async fn build_version(
        &self,
        category: Category,
        item_dir: &Path,
        item: &str,
        label: &str,
        report: &mut BuildReport,
    ) -> Result<VersionIndex> {
        let version_dir = item_dir.join(label);
        let files = scanner::list_files(&version_dir).await?;
        let info = metadata::read_version_info(&version_dir).await;

        let target_dir = self.storage.version_dir(category, item, label);
        fs::create_dir_all(&target_dir)
            .await
            .with_context(|| format!("Failed to create {}", target_dir.display()))?;

        // Only files that made it into the publish tree are indexed.
        let mut published = Vec::with_capacity(files.len());
        for file in files {
            let from = version_dir.join(&file);
            match fs::copy(&from, target_dir.join(&file)).await {
                Ok(_) => {
                    report.files += 1;
                    published.push(file);
                }
                Err(e) => {
                    warn!("Failed to copy {}: {}", from.display(), e);
                    report.skipped_files += 1;
                }
            }
        }
        copy_sidecar(
            &version_dir.join(VERSION_INFO_FILE),
            &target_dir.join(VERSION_INFO_FILE),
        )
        .await;

        report.versions += 1;
        Ok(VersionIndex {
            version: label.to_string(),
            info,
            files: published,
        })
    }
}

async fn is_dir(path: &Path) -> bool {
    fs::metadata(path).await.map(|m| m.is_dir()).unwrap_or(false)
}

async fn copy_sidecar(from: &Path, to: &Path) {
    match fs::copy(from, to).await {
        Ok(_) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to copy {}: {}", from.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn write(path: PathBuf, contents: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    fn sample_source(root: &Path) {
        write(root.join("plugin/tasks/info.txt"), "Task tracking\n");
        write(root.join("plugin/tasks/1.0.0/tasks.dll"), "binary");
        write(root.join("plugin/tasks/1.0.0/info.json"), r#"{"author":"kim"}"#);
        write(root.join("plugin/tasks/1.1.0/tasks.dll"), "binary v2");
        write(root.join("plugin/tasks/1.1.0/notes.txt"), "changes");
        write(root.join("skin/dark/2.0/dark.zip"), "zip");
    }

    fn read_tree(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
        let mut out = BTreeMap::new();
        let mut stack = vec![root.to_path_buf()];
        while let Some(dir) = stack.pop() {
            for entry in std::fs::read_dir(&dir).unwrap() {
                let path = entry.unwrap().path();
                if path.is_dir() {
                    stack.push(path);
                } else {
                    let rel = path.strip_prefix(root).unwrap().to_path_buf();
                    out.insert(rel, std::fs::read(&path).unwrap());
                }
            }
        }
        out
    }

    #[tokio::test]
    async fn builds_nested_index_and_publishes_files() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("public");
        let publish = tmp.path().join("publish");
        sample_source(&source);

        let builder = IndexBuilder::new(source, publish.clone());
        let report = builder.build().await.unwrap();

        assert_eq!(report.categories, 2);
        assert_eq!(report.items, 2);
        assert_eq!(report.versions, 3);
        assert_eq!(report.files, 4);

        let plugins = builder
            .storage()
            .load_index(Category::Plugin)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(plugins.len(), 1);
        let tasks = &plugins[0];
        assert_eq!(tasks.name, "tasks");
        assert_eq!(tasks.description, "Task tracking");
        assert_eq!(tasks.version_labels(), vec!["1.0.0", "1.1.0"]);
        assert_eq!(tasks.versions[0].info["author"], "kim");
        assert_eq!(tasks.versions[0].files, vec!["tasks.dll"]);
        assert_eq!(tasks.versions[1].files, vec!["notes.txt", "tasks.dll"]);

        let published = publish.join("down/plugin/tasks");
        assert!(published.join("info.txt").is_file());
        assert!(published.join("1.0.0/info.json").is_file());
        assert_eq!(
            std::fs::read_to_string(published.join("1.1.0/tasks.dll")).unwrap(),
            "binary v2"
        );
    }

    #[tokio::test]
    async fn missing_category_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("public");
        sample_source(&source);

        let builder = IndexBuilder::new(source, tmp.path().join("publish"));
        builder.build().await.unwrap();

        let storage = builder.storage();
        assert!(storage.load_index(Category::Code).await.unwrap().is_none());
        assert!(!storage.index_path(Category::Code).exists());
    }

    #[tokio::test]
    async fn version_info_txt_is_published_as_an_asset() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("public");
        let publish = tmp.path().join("publish");
        write(source.join("plugin/p/1.0/p.dll"), "binary");
        write(source.join("plugin/p/1.0/info.txt"), "release notes");

        let builder = IndexBuilder::new(source, publish.clone());
        builder.build().await.unwrap();

        let plugins = builder
            .storage()
            .load_index(Category::Plugin)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(plugins[0].description, "");
        assert_eq!(plugins[0].versions[0].files, vec!["info.txt", "p.dll"]);
        assert_eq!(
            std::fs::read_to_string(publish.join("down/plugin/p/1.0/info.txt")).unwrap(),
            "release notes"
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn unreadable_file_is_skipped_and_siblings_survive() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("public");
        sample_source(&source);
        let locked = source.join("plugin/tasks/1.1.0/notes.txt");
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();
        if std::fs::read(&locked).is_ok() {
            // Running with privileges that ignore file modes.
            return;
        }

        let builder = IndexBuilder::new(source, tmp.path().join("publish"));
        let report = builder.build().await.unwrap();

        assert_eq!(report.skipped_files, 1);
        assert_eq!(report.files, 3);
        let plugins = builder
            .storage()
            .load_index(Category::Plugin)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(plugins[0].versions[1].files, vec!["tasks.dll"]);
        assert_eq!(plugins[0].versions[0].files, vec!["tasks.dll"]);
    }

    #[tokio::test]
    async fn only_requested_categories_are_built() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("public");
        sample_source(&source);

        let builder = IndexBuilder::new(source, tmp.path().join("publish"))
            .with_categories(&[Category::Skin]);
        let report = builder.build().await.unwrap();

        assert_eq!(report.categories, 1);
        let storage = builder.storage();
        assert!(storage.load_index(Category::Plugin).await.unwrap().is_none());
        assert_eq!(
            storage.load_index(Category::Skin).await.unwrap().unwrap()[0].name,
            "dark"
        );
    }

    #[tokio::test]
    async fn malformed_metadata_only_affects_its_version() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("public");
        sample_source(&source);
        write(source.join("plugin/tasks/1.1.0/info.json"), "{ not json");

        let builder = IndexBuilder::new(source, tmp.path().join("publish"));
        builder.build().await.unwrap();

        let plugins = builder
            .storage()
            .load_index(Category::Plugin)
            .await
            .unwrap()
            .unwrap();
        let tasks = &plugins[0];
        assert_eq!(tasks.versions[0].info["author"], "kim");
        assert!(tasks.versions[1].info.is_empty());
        assert_eq!(tasks.versions[1].files, vec!["notes.txt", "tasks.dll"]);
    }

    #[tokio::test]
    async fn rebuild_is_reproducible_and_drops_stale_output() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("public");
        let publish = tmp.path().join("publish");
        sample_source(&source);

        let builder = IndexBuilder::new(source.clone(), publish.clone());
        builder.build().await.unwrap();
        let first = read_tree(&publish);

        std::fs::write(publish.join("down/stale.bin"), b"old").unwrap();
        builder.build().await.unwrap();
        let second = read_tree(&publish);

        assert_eq!(first, second);

        std::fs::remove_dir_all(source.join("skin/dark")).unwrap();
        builder.build().await.unwrap();
        let skins = builder
            .storage()
            .load_index(Category::Skin)
            .await
            .unwrap()
            .unwrap();
        assert!(skins.is_empty());
        assert!(!publish.join("down/skin/dark").exists());
    }

    #[tokio::test]
    async fn same_item_name_in_two_categories() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("public");
        write(source.join("plugin/foo/1.0/foo.dll"), "plugin");
        write(source.join("skin/foo/3.0/foo.zip"), "skin");

        let builder = IndexBuilder::new(source, tmp.path().join("publish"));
        builder.build().await.unwrap();

        let storage = builder.storage();
        let plugin = storage.load_index(Category::Plugin).await.unwrap().unwrap();
        let skin = storage.load_index(Category::Skin).await.unwrap().unwrap();
        assert_eq!(plugin[0].version_labels(), vec!["1.0"]);
        assert_eq!(skin[0].version_labels(), vec!["3.0"]);
        assert_eq!(skin[0].versions[0].files, vec!["foo.zip"]);
    }

    #[tokio::test]
    async fn unusable_publish_root_aborts() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("public");
        sample_source(&source);
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, b"file").unwrap();

        let builder = IndexBuilder::new(source, blocker.join("publish"));
        assert!(builder.build().await.is_err());
    }
}
