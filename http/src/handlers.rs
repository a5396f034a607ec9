use crate::error::{internal_error, not_found, ApiError};
use crate::models::*;
use crate::server::CatalogServiceHandler;
use asset_catalog_core::{CatalogSnapshot, CatalogStorage, Category};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, StatusCode};
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

/// Read-only server state: built once at startup, shared by every request.
pub struct AppState {
    pub storage: CatalogStorage,
    pub snapshot: CatalogSnapshot,
}

impl AppState {
    pub async fn load(publish_root: PathBuf) -> Self {
        let storage = CatalogStorage::new(publish_root);
        let snapshot = CatalogSnapshot::load(&storage, &Category::ALL).await;
        Self { storage, snapshot }
    }
}

/// File name for `Content-Disposition`. Control characters and quotes are
/// not valid inside the quoted header value.
fn attachment_name(path: &std::path::Path) -> String {
    let name: String = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_control() && *c != '"')
        .collect();
    if name.is_empty() {
        "download".to_string()
    } else {
        name
    }
}

/// Stream a published file as an attachment.
async fn serve_file_response(path: PathBuf) -> Result<axum::response::Response, ApiError> {
    let file = match File::open(&path).await {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Err(not_found("File not found")),
        Err(e) => return Err(internal_error(e)),
    };
    let meta = file.metadata().await.map_err(internal_error)?;
    if !meta.is_file() {
        return Err(not_found("File not found"));
    }

    let filename = attachment_name(&path);

    let stream = ReaderStream::new(file);
    let body = Body::from_stream(stream);

    axum::response::Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(header::CONTENT_LENGTH, meta.len())
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        )
        .body(body)
        .map_err(internal_error)
}

#[async_trait]
impl CatalogServiceHandler for AppState {
    async fn list_items(&self, category: Category) -> Result<Vec<ItemSummary>, ApiError> {
        Ok(self
            .snapshot
            .items(category)
            .iter()
            .map(|item| ItemSummary {
                name: item.name.clone(),
                description: item.description.clone(),
                versions: item.version_labels(),
            })
            .collect())
    }

    async fn get_item(&self, category: Category, item: String) -> Result<ItemDetail, ApiError> {
        let entry = self.snapshot.find_item(category, &item)?;

        let versions = entry
            .versions
            .iter()
            .map(|v| VersionSummary {
                version: v.version.clone(),
                info: v.info.clone(),
                files: v
                    .files
                    .iter()
                    .map(|f| FileLink {
                        name: f.clone(),
                        download_url: CatalogStorage::download_url(
                            category,
                            &entry.name,
                            &v.version,
                            f,
                        ),
                    })
                    .collect(),
            })
            .collect();

        Ok(ItemDetail {
            name: entry.name.clone(),
            description: entry.description.clone(),
            versions,
        })
    }

    async fn get_version(
        &self,
        category: Category,
        item: String,
        version: String,
    ) -> Result<VersionDetail, ApiError> {
        let (entry, found) = self.snapshot.find_version(category, &item, &version)?;

        // The publish tree may have changed since the index was built.
        let files = self
            .storage
            .stat_files(category, &entry.name, found)
            .await?
            .into_iter()
            .map(|f| FileDetail {
                name: f.name,
                download_url: f.download_url,
                size: f.size,
            })
            .collect();

        Ok(VersionDetail {
            name: entry.name.clone(),
            version: found.version.clone(),
            info: found.info.clone(),
            files,
        })
    }

    async fn download(
        &self,
        category: Category,
        item: String,
        version: String,
        filename: String,
    ) -> Result<axum::response::Response, ApiError> {
        let path = self
            .storage
            .published_file(category, &item, &version, &filename)
            .ok_or_else(|| not_found("File not found"))?;

        serve_file_response(path).await
    }
}
