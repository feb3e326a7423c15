//! Upload orchestration: decode, place, persist, answer.

use chrono::{DateTime, Utc};
use folio_core::{AppError, ImageAddress, ImageUrlBuilder, Owner, RequestOutcome};
use folio_processing::{ImageCodec, UploadForm};
use folio_storage::{resolve_write, Storage};
use std::sync::Arc;
use std::time::Instant;

/// A stored upload.
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub address: ImageAddress,
    pub url: String,
    pub content_type: &'static str,
    pub size: usize,
    pub dimensions: Option<(u32, u32)>,
    /// Server time at which the write completed.
    pub completed_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct UploadService {
    codec: Arc<ImageCodec>,
    storage: Arc<dyn Storage>,
    urls: ImageUrlBuilder,
}

impl UploadService {
    pub fn new(codec: ImageCodec, storage: Arc<dyn Storage>, urls: ImageUrlBuilder) -> Self {
        Self {
            codec: Arc::new(codec),
            storage,
            urls,
        }
    }

    pub fn max_image_bytes(&self) -> usize {
        self.codec.max_image_bytes()
    }

    /// Store one upload for `owner`. Nothing reaches the store unless the
    /// payload decodes into an allowed image and the target location is valid.
    pub async fn handle(&self, owner: &Owner, form: UploadForm) -> Result<UploadOutcome, AppError> {
        let started = Instant::now();
        let result = self.store(owner, form).await;
        let outcome = RequestOutcome::of(&result);
        let duration_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(upload) => tracing::info!(
                owner = %owner,
                key = %upload.address,
                content_type = upload.content_type,
                size_bytes = upload.size,
                width = upload.dimensions.map(|d| d.0),
                height = upload.dimensions.map(|d| d.1),
                outcome = %outcome,
                duration_ms,
                "Image uploaded"
            ),
            Err(e) if outcome == RequestOutcome::Rejected => tracing::debug!(
                owner = %owner,
                error = %e,
                outcome = %outcome,
                duration_ms,
                "Upload rejected"
            ),
            Err(e) => tracing::error!(
                owner = %owner,
                error = %e,
                outcome = %outcome,
                duration_ms,
                "Upload failed"
            ),
        }

        result
    }

    async fn store(&self, owner: &Owner, form: UploadForm) -> Result<UploadOutcome, AppError> {
        // Base64 decoding and format sniffing are CPU bound.
        let codec = self.codec.clone();
        let decoded = tokio::task::spawn_blocking(move || codec.decode(form))
            .await
            .map_err(|e| AppError::Internal(format!("Upload decode task failed: {}", e)))??;

        let image = decoded.image;
        let location = resolve_write(
            owner,
            &decoded.folder,
            decoded.name.as_ref(),
            image.extension,
        )?;
        let size = image.size();

        self.storage
            .put(&location, image.bytes, image.content_type)
            .await?;

        Ok(UploadOutcome {
            url: self.urls.build(location.address()),
            address: location.address().clone(),
            content_type: image.content_type,
            size,
            dimensions: image.dimensions,
            completed_at: Utc::now(),
        })
    }
}
