//! In-memory copy of the category indexes, loaded once when the server
//! starts. It is never refreshed; a rebuild needs a restart to be seen.

use crate::error::CatalogError;
use crate::model::{Category, ItemIndex, VersionIndex};
use crate::storage::CatalogStorage;
use std::collections::HashMap;
use tracing::{error, info};

#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    indexes: HashMap<Category, Vec<ItemIndex>>,
}

impl CatalogSnapshot {
    /// Load every category index. A missing or unreadable index leaves its
    /// category empty instead of failing startup.
    pub async fn load(storage: &CatalogStorage, categories: &[Category]) -> Self {
        let mut indexes = HashMap::new();
        for &category in categories {
            let items = match storage.load_index(category).await {
                Ok(Some(items)) => {
                    info!("Loaded {} index: {} items", category, items.len());
                    items
                }
                Ok(None) => {
                    info!("No {} index found, serving it empty", category);
                    Vec::new()
                }
                Err(e) => {
                    error!("Failed to load {} index: {:#}", category, e);
                    Vec::new()
                }
            };
            indexes.insert(category, items);
        }
        Self { indexes }
    }

    #[cfg(test)]
    pub fn from_indexes(indexes: impl IntoIterator<Item = (Category, Vec<ItemIndex>)>) -> Self {
        Self {
            indexes: indexes.into_iter().collect(),
        }
    }

    pub fn items(&self, category: Category) -> &[ItemIndex] {
        self.indexes.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn find_item(&self, category: Category, name: &str) -> Result<&ItemIndex, CatalogError> {
        self.items(category)
            .iter()
            .find(|i| i.name == name)
            .ok_or_else(|| CatalogError::ItemNotFound {
                category,
                item: name.to_string(),
            })
    }

    pub fn find_version(
        &self,
        category: Category,
        item: &str,
        version: &str,
    ) -> Result<(&ItemIndex, &VersionIndex), CatalogError> {
        let entry = self.find_item(category, item)?;
        let found = entry
            .version(version)
            .ok_or_else(|| CatalogError::VersionNotFound {
                item: item.to_string(),
                version: version.to_string(),
            })?;
        Ok((entry, found))
    }
}
