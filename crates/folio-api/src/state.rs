//! Application state shared by every handler.

use crate::services::{RetrievalService, UploadService};
use anyhow::Context;
use folio_core::{Config, Folder, ImageUrlBuilder};
use folio_processing::ImageCodec;
use folio_storage::Storage;
use std::sync::Arc;

pub struct AppState {
    pub config: Config,
    pub storage: Arc<dyn Storage>,
    pub upload: UploadService,
    pub retrieval: RetrievalService,
}

impl AppState {
    pub fn new(config: Config, storage: Arc<dyn Storage>) -> Result<Self, anyhow::Error> {
        let urls = ImageUrlBuilder::new(config.public_base_url())
            .context("PUBLIC_BASE_URL is not a valid base URL")?;
        let default_folder = Folder::parse(config.default_folder())
            .map_err(|e| anyhow::anyhow!("DEFAULT_FOLDER is invalid: {}", e))?;
        let codec = ImageCodec::new(
            default_folder,
            config.max_file_size_bytes(),
            config.allowed_content_types().to_vec(),
        );

        Ok(Self {
            upload: UploadService::new(codec, storage.clone(), urls.clone()),
            retrieval: RetrievalService::new(storage.clone(), urls),
            storage,
            config,
        })
    }
}
