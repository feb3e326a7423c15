//! Read side: one image, or the listing of a folder.

use folio_core::{AppError, FolderListing, ImageName, ImageUrlBuilder, RequestOutcome};
use folio_storage::{resolve_listing, resolve_read, Storage, StoredObject};
use std::sync::Arc;

#[derive(Debug)]
pub enum Retrieved {
    Image(StoredObject),
    Listing(FolderListing),
}

#[derive(Clone)]
pub struct RetrievalService {
    storage: Arc<dyn Storage>,
    urls: ImageUrlBuilder,
}

impl RetrievalService {
    pub fn new(storage: Arc<dyn Storage>, urls: ImageUrlBuilder) -> Self {
        Self { storage, urls }
    }

    /// A name fetches that image; no name (or an empty one) lists the folder.
    pub async fn handle(
        &self,
        owner: &str,
        folder: &str,
        name: Option<&str>,
    ) -> Result<Retrieved, AppError> {
        let name = name.filter(|n| !n.is_empty());
        let result = match name {
            Some(name) => self.image(owner, folder, name).await.map(Retrieved::Image),
            None => self.listing(owner, folder).await.map(Retrieved::Listing),
        };

        let outcome = RequestOutcome::of(&result);
        match &result {
            Ok(Retrieved::Image(object)) => tracing::debug!(
                owner,
                folder,
                name,
                size_bytes = object.size(),
                outcome = %outcome,
                "Image served"
            ),
            Ok(Retrieved::Listing(listing)) => tracing::debug!(
                owner,
                folder,
                entries = listing.entries.len(),
                outcome = %outcome,
                "Folder listed"
            ),
            Err(e) if outcome == RequestOutcome::Rejected => {
                tracing::debug!(owner, folder, name, error = %e, outcome = %outcome, "Retrieval rejected")
            }
            Err(e) => {
                tracing::error!(owner, folder, name, error = %e, outcome = %outcome, "Retrieval failed")
            }
        }

        result
    }

    async fn image(&self, owner: &str, folder: &str, name: &str) -> Result<StoredObject, AppError> {
        let location = resolve_read(owner, folder, name)?;
        Ok(self.storage.get(&location).await?)
    }

    async fn listing(&self, owner: &str, folder: &str) -> Result<FolderListing, AppError> {
        let query = resolve_listing(owner, folder)?;
        let mut listing = self.storage.list(&query).await?;

        listing.url = Some(self.urls.folder_url(query.folder()));
        for entry in &mut listing.entries {
            if let Ok(name) = ImageName::parse(entry.name.as_str()) {
                entry.url = Some(self.urls.build(&query.folder().image(name)));
            }
        }

        Ok(listing)
    }
}
