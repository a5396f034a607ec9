use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Top-level grouping of published content. Each variant maps to one
/// directory under the source and publish roots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Plugin,
    Skin,
    Code,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Plugin, Category::Skin, Category::Code];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Plugin => "plugin",
            Category::Skin => "skin",
            Category::Code => "code",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One item as persisted in a category index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemIndex {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub versions: Vec<VersionIndex>,
}

impl ItemIndex {
    pub fn version(&self, label: &str) -> Option<&VersionIndex> {
        self.versions.iter().find(|v| v.version == label)
    }

    pub fn version_labels(&self) -> Vec<String> {
        self.versions.iter().map(|v| v.version.clone()).collect()
    }
}

/// One version of an item. `files` holds bare file names; sizes are never
/// stored because they are read from the publish tree at serve time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionIndex {
    pub version: String,
    #[serde(default)]
    pub info: Map<String, Value>,
    pub files: Vec<String>,
}

/// A published file that exists on disk right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    pub download_url: String,
    pub size: u64,
}
