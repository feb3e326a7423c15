use crate::namespace::{ListingQuery, Location};
use crate::traits::{Storage, StorageError, StorageResult, StoredObject};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use dashmap::DashMap;
use folio_core::{FolderListing, ListingEntry};
use std::sync::Arc;

/// In-process storage backed by a sharded map.
///
/// Objects are immutable once inserted and replaced whole on `put`, so readers
/// always clone a complete object. Contents are lost when the process exits.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    objects: Arc<DashMap<String, StoredObject>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn put(
        &self,
        location: &Location,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<()> {
        let key = location.key();
        let size = data.len();
        self.objects.insert(
            key.clone(),
            StoredObject {
                bytes: data,
                content_type: content_type.to_string(),
                last_modified: Utc::now(),
            },
        );
        tracing::debug!(key = %key, size_bytes = size, "Memory storage put successful");
        Ok(())
    }

    async fn get(&self, location: &Location) -> StorageResult<StoredObject> {
        let key = location.key();
        self.objects
            .get(&key)
            .map(|entry| entry.value().clone())
            .ok_or(StorageError::NotFound(key))
    }

    async fn list(&self, query: &ListingQuery) -> StorageResult<FolderListing> {
        let prefix = query.prefix();
        let mut entries: Vec<ListingEntry> = self
            .objects
            .iter()
            .filter_map(|entry| {
                let name = entry.key().strip_prefix(&prefix)?;
                Some(ListingEntry {
                    name: name.to_string(),
                    size: entry.value().size(),
                    content_type: entry.value().content_type.clone(),
                    last_modified: entry.value().last_modified,
                    url: None,
                })
            })
            .collect();

        if entries.is_empty() {
            return Err(StorageError::NotFound(prefix));
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        let folder = query.folder();
        Ok(FolderListing {
            owner: folder.owner.to_string(),
            folder: folder.folder.to_string(),
            url: None,
            entries,
        })
    }

    async fn exists(&self, location: &Location) -> StorageResult<bool> {
        Ok(self.objects.contains_key(&location.key()))
    }

    async fn health_check(&self) -> StorageResult<()> {
        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}
