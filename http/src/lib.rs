//! HTTP surface of the asset catalog.

pub mod error;
pub mod handlers;
pub mod models;
pub mod server;

use asset_catalog_core::Category;
use axum::http::{HeaderName, HeaderValue};
use axum::routing::get;
use axum::{Json, Router};
use handlers::AppState;
use server::create_router;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use server::CatalogServiceHandler;

pub const VERSION_HEADER: &str = "x-catalog-version";

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "asset-catalog",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Full application router over a loaded catalog.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .merge(create_router::<AppState>(&Category::ALL))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(SetResponseHeaderLayer::overriding(
                    HeaderName::from_static(VERSION_HEADER),
                    HeaderValue::from_static(env!("CARGO_PKG_VERSION")),
                )),
        )
        .with_state(state)
}
