use anyhow::Result;
use asset_catalog_core::{CatalogConfig, Category};
use asset_catalog_http::app;
use asset_catalog_http::handlers::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    let mut config = CatalogConfig::from_env();
    if let Some(publish) = args.get(1) {
        config.publish_root = PathBuf::from(publish);
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    info!("Starting asset catalog HTTP server");
    info!("Publish directory: {}", config.publish_root.display());

    let state = Arc::new(AppState::load(config.publish_root).await);
    let router = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Listening on http://{}", addr);
    for category in Category::ALL {
        info!("  /api/{} - list {} items", category, category);
        info!("  /api/{}/:item - versions of a {} item", category, category);
        info!("  /api/{}/:item/:version - files of one version", category);
    }
    info!("Downloads under /down/:category/:item/:version/:filename");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
