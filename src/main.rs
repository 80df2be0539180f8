// Main entry point - Dependency injection, server setup and client commands
mod application;
mod cli;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use crate::application::dataset_repository::{ArtifactStore, DatasetRepository};
use crate::application::dataset_service::DatasetService;
use crate::cli::{Args, ClientArgs, Command};
use crate::domain::dataset::DatasetId;
use crate::infrastructure::api_client::ApiClient;
use crate::infrastructure::client_settings::{ClientSettings, SettingsStore};
use crate::infrastructure::config::{load_app_config, StorageBackend};
use crate::infrastructure::fs_store::{FsArtifactStore, FsDatasetRepository};
use crate::infrastructure::memory_store::{MemoryArtifactStore, MemoryDatasetRepository};
use crate::presentation::app_state::AppState;
use crate::presentation::router::build_router;
use crate::presentation::summary_view::{history_line, render_summary};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse_args();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match args.command {
        Command::Serve { config } => serve(config.as_deref()).await,
        Command::Configure { client } => configure(client),
        Command::Upload { client, file } => {
            let record = api_client(&client)?.upload(&file).await?;
            print!("{}", render_summary(&record));
            Ok(())
        }
        Command::History { client } => {
            let history = api_client(&client)?.history().await?;
            if history.is_empty() {
                println!("No uploads yet.");
            }
            for record in &history {
                println!("{}", history_line(record));
            }
            Ok(())
        }
        Command::Summary { client, id } => {
            let record = api_client(&client)?.summary(DatasetId(id)).await?;
            print!("{}", render_summary(&record));
            Ok(())
        }
        Command::Report { client, id, output } => {
            let pdf = api_client(&client)?.report(DatasetId(id)).await?;
            let output = output.unwrap_or_else(|| PathBuf::from(format!("dataset_{}_report.pdf", id)));
            tokio::fs::write(&output, &pdf)
                .await
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("Saved report to {}", output.display());
            Ok(())
        }
    }
}

async fn serve(config_path: Option<&str>) -> anyhow::Result<()> {
    // Load configuration
    let app_config = load_app_config(config_path)?;

    // Create stores (infrastructure layer)
    let (repository, artifacts) = match app_config.storage.backend {
        StorageBackend::Filesystem => {
            let data_dir = &app_config.storage.data_dir;
            tracing::info!("Storing datasets under {}", data_dir.display());
            (
                Arc::new(FsDatasetRepository::open(data_dir).await?) as Arc<dyn DatasetRepository>,
                Arc::new(FsArtifactStore::open(data_dir).await?) as Arc<dyn ArtifactStore>,
            )
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; uploads are lost on restart");
            (
                Arc::new(MemoryDatasetRepository::new()) as Arc<dyn DatasetRepository>,
                Arc::new(MemoryArtifactStore::new()) as Arc<dyn ArtifactStore>,
            )
        }
    };

    // Create services (application layer)
    let dataset_service = DatasetService::new(repository, artifacts, app_config.retention.limit);

    // A lowered limit applies to history left over from earlier runs
    let report = dataset_service.enforce_retention().await?;
    if !report.evicted.is_empty() {
        tracing::info!("Evicted {} datasets at start-up", report.evicted.len());
    }

    // Create application state
    let state = Arc::new(AppState { dataset_service });

    // Build router (presentation layer)
    let router = build_router(state, app_config.server.max_upload_bytes);

    // Start server
    let addr: SocketAddr = app_config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address: {}", app_config.server.bind))?;
    tracing::info!("Starting equipment-insights service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}

fn configure(client: ClientArgs) -> anyhow::Result<()> {
    let store = SettingsStore::new(&client.settings);
    let settings = store.load()?.with_overrides(client.base_url, client.token);
    store.save(&settings)?;
    println!("Saved connection settings to {}", store.path().display());
    Ok(())
}

fn api_client(client: &ClientArgs) -> anyhow::Result<ApiClient> {
    let settings: ClientSettings = SettingsStore::new(&client.settings)
        .load()?
        .with_overrides(client.base_url.clone(), client.token.clone());
    ApiClient::new(settings)
}
