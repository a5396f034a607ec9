//! Route table of the catalog API.
//!
//! Routes are registered once per category, so a category outside the
//! fixed set has no route at all and falls through to axum's 404.

use crate::error::ApiError;
use crate::models::*;
use asset_catalog_core::Category;
use async_trait::async_trait;
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;

#[async_trait]
pub trait CatalogServiceHandler: Send + Sync + 'static {
    async fn list_items(&self, category: Category) -> Result<Vec<ItemSummary>, ApiError>;
    async fn get_item(&self, category: Category, item: String) -> Result<ItemDetail, ApiError>;
    async fn get_version(
        &self,
        category: Category,
        item: String,
        version: String,
    ) -> Result<VersionDetail, ApiError>;
    async fn download(
        &self,
        category: Category,
        item: String,
        version: String,
        filename: String,
    ) -> Result<axum::response::Response, ApiError>;
}

async fn catalog_service_list_items<S: CatalogServiceHandler>(
    state: Arc<S>,
    category: Category,
) -> Result<Json<Vec<ItemSummary>>, ApiError> {
    let result = state.list_items(category).await?;
    Ok(Json(result))
}

async fn catalog_service_get_item<S: CatalogServiceHandler>(
    state: Arc<S>,
    category: Category,
    item: String,
) -> Result<Json<ItemDetail>, ApiError> {
    let result = state.get_item(category, item).await?;
    Ok(Json(result))
}

async fn catalog_service_get_version<S: CatalogServiceHandler>(
    state: Arc<S>,
    category: Category,
    item: String,
    version: String,
) -> Result<Json<VersionDetail>, ApiError> {
    let result = state.get_version(category, item, version).await?;
    Ok(Json(result))
}

async fn catalog_service_download<S: CatalogServiceHandler>(
    state: Arc<S>,
    category: Category,
    item: String,
    version: String,
    filename: String,
) -> Result<axum::response::Response, ApiError> {
    state.download(category, item, version, filename).await
}

pub fn catalog_service_routes<S: CatalogServiceHandler>(category: Category) -> Router<Arc<S>> {
    Router::new()
        .route(
            &format!("/api/{}", category),
            get(move |State(state): State<Arc<S>>| {
                catalog_service_list_items(state, category)
            }),
        )
        .route(
            &format!("/api/{}/:item", category),
            get(
                move |State(state): State<Arc<S>>, Path(item): Path<String>| {
                    catalog_service_get_item(state, category, item)
                },
            ),
        )
        .route(
            &format!("/api/{}/:item/:version", category),
            get(
                move |State(state): State<Arc<S>>,
                      Path((item, version)): Path<(String, String)>| {
                    catalog_service_get_version(state, category, item, version)
                },
            ),
        )
        .route(
            &format!("/down/{}/:item/:version/:filename", category),
            get(
                move |State(state): State<Arc<S>>,
                      Path((item, version, filename)): Path<(String, String, String)>| {
                    catalog_service_download(state, category, item, version, filename)
                },
            ),
        )
}

pub fn create_router<S: CatalogServiceHandler>(categories: &[Category]) -> Router<Arc<S>> {
    categories
        .iter()
        .fold(Router::new(), |router, &category| {
            router.merge(catalog_service_routes::<S>(category))
        })
}
