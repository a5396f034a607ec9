//! Optional sidecar metadata next to published assets.
//!
//! A version directory may carry `info.json`, a JSON object describing the
//! release. An item directory may carry `info.txt`, a one-line description.
//! Neither is required, and a broken one never fails a build.

use serde_json::{Map, Value};
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;
use tracing::warn;

pub const VERSION_INFO_FILE: &str = "info.json";
pub const ITEM_DESCRIPTION_FILE: &str = "info.txt";

/// True for version-directory files that hold metadata rather than
/// downloadable content. `info.txt` only has meaning at item level, so a
/// version's `info.txt` is an ordinary asset.
pub fn is_version_sidecar(name: &str) -> bool {
    name == VERSION_INFO_FILE
}

/// Read `info.json` from a version directory. Absent, unreadable or invalid
/// documents all yield an empty map.
pub async fn read_version_info(version_dir: &Path) -> Map<String, Value> {
    let path = version_dir.join(VERSION_INFO_FILE);
    let data = match fs::read_to_string(&path).await {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => return Map::new(),
        Err(e) => {
            warn!("Failed to read {}: {}", path.display(), e);
            return Map::new();
        }
    };

    match serde_json::from_str::<Value>(&data) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            warn!("Ignoring {}: expected a JSON object", path.display());
            Map::new()
        }
        Err(e) => {
            warn!("Failed to parse {}: {}", path.display(), e);
            Map::new()
        }
    }
}

/// Read the trimmed `info.txt` description of an item directory.
pub async fn read_item_description(item_dir: &Path) -> String {
    let path = item_dir.join(ITEM_DESCRIPTION_FILE);
    match fs::read_to_string(&path).await {
        Ok(text) => text.trim().to_string(),
        Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
        Err(e) => {
            warn!("Failed to read description {}: {}", path.display(), e);
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_info_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(read_version_info(tmp.path()).await.is_empty());
        assert_eq!(read_item_description(tmp.path()).await, "");
    }

    #[tokio::test]
    async fn info_object_is_parsed() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join(VERSION_INFO_FILE),
            r#"{"author":"kim","changelog":["fix"]}"#,
        )
        .unwrap();

        let info = read_version_info(tmp.path()).await;
        assert_eq!(info["author"], "kim");
        assert_eq!(info["changelog"][0], "fix");
    }

    #[tokio::test]
    async fn malformed_or_non_object_info_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(VERSION_INFO_FILE);

        std::fs::write(&path, "{ not json").unwrap();
        assert!(read_version_info(tmp.path()).await.is_empty());

        std::fs::write(&path, "[1, 2, 3]").unwrap();
        assert!(read_version_info(tmp.path()).await.is_empty());
    }

    #[tokio::test]
    async fn description_is_trimmed() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join(ITEM_DESCRIPTION_FILE),
            "  Dark theme for the editor\n",
        )
        .unwrap();
        assert_eq!(
            read_item_description(tmp.path()).await,
            "Dark theme for the editor"
        );
    }
}
