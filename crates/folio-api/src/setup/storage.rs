use anyhow::{Context, Result};
use folio_core::Config;
use folio_storage::{create_storage, Storage};
use std::sync::Arc;

/// Create the configured backend and make sure it can take writes.
pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    let storage = create_storage(config)
        .await
        .context("Failed to initialize image storage")?;

    storage
        .health_check()
        .await
        .context("Image storage failed its startup health check")?;

    tracing::info!(
        backend = %storage.backend_type(),
        path = ?config.local_storage_path(),
        "Image storage initialized"
    );

    Ok(storage)
}
