use crate::config::ExportConfig;
use crate::io::local::HttpImageFetcher;
use crate::notion::client::HttpNotionClient;
use crate::services::ExportService;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub mod config;
mod domain;
mod io;
mod notion;
mod parser;
mod services;

#[cfg(test)]
mod tests;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // determine environment variables
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // load centralized config
    let config = Arc::new(ExportConfig::from_env()?);
    info!(
        "Exporting Notion database {} into {} and {}",
        config.database_id,
        config.posts_dir.display(),
        config.images_dir.display()
    );

    let service = Arc::new(ExportService::new(
        Box::new(HttpNotionClient::from_config(&config)),
        Box::new(HttpImageFetcher::new()),
        config.clone(),
    ));

    // a failed listing ends the run without an error exit, page failures are already
    // logged by the service
    if let Err(e) = service.export_all().await {
        error!("Error retrieving pages from database: {:#}", e);
    }

    Ok(())
}
