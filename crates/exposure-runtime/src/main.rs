//! # Exposure Runtime
//!
//! Entry point: opens the exposure store and runs retention until Ctrl-C.

use std::sync::Arc;

use anyhow::{Context, Result};
use exposure_store::{
    BincodeExposureSerializer, ExposureDependencies, ExposureService, SystemTimeSource,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use exposure_runtime::{spawn_retention_task, Backend, RetentionConfig, RuntimeConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    // Load configuration
    let config = RuntimeConfig::from_env().context("Invalid configuration")?;

    let backend = Backend::open(&config)?;
    info!(
        backend = backend.name(),
        data_dir = %config.data_dir.display(),
        retention_hours = config.retention_hours,
        "Exposure store opened"
    );

    let service = Arc::new(ExposureService::new(
        ExposureDependencies {
            kv_store: backend,
            serializer: BincodeExposureSerializer,
        },
        config.store.clone(),
    ));

    let retention = spawn_retention_task(
        Arc::clone(&service),
        Arc::new(SystemTimeSource),
        RetentionConfig {
            retention: config.retention(),
            cleanup_interval: config.cleanup_interval,
        },
    );

    info!("Exposure runtime is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;

    info!("Initiating graceful shutdown...");
    retention.shutdown().await;
    info!("Shutdown complete");

    Ok(())
}
