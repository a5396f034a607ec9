use anyhow::Result;
use asset_catalog_core::{CatalogConfig, IndexBuilder};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Build failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let mut config = CatalogConfig::from_env();
    if let Some(source) = args.get(1) {
        config.source_root = PathBuf::from(source);
    }
    if let Some(publish) = args.get(2) {
        config.publish_root = PathBuf::from(publish);
    }

    let builder = IndexBuilder::new(config.source_root, config.publish_root.clone());
    let report = builder.build().await?;

    info!("Catalog build completed: {}", report);
    info!("Deploy contents from: {}", config.publish_root.display());
    Ok(())
}
