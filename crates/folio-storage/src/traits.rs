//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::namespace::{ListingQuery, Location};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use folio_core::{AppError, FolderListing};
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Corrupt object: {0}")]
    Corrupt(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(what) => AppError::NotFound(format!("{} not found", what)),
            StorageError::InvalidKey(msg) => AppError::InvalidPath(msg),
            other => AppError::StoreUnavailable(other.to_string()),
        }
    }
}

/// One stored image as read back from a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Bytes,
    pub content_type: String,
    pub last_modified: DateTime<Utc>,
}

impl StoredObject {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Storage abstraction trait
///
/// Every backend honours the same contract: `put` replaces the whole object
/// atomically, `get` of a location never written is `NotFound`, and `list` of a
/// folder with no images is `NotFound`.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Persist `data` at `location`, replacing any previous content.
    async fn put(&self, location: &Location, data: Bytes, content_type: &str)
        -> StorageResult<()>;

    /// Read back bytes and content type written by the last successful `put`.
    async fn get(&self, location: &Location) -> StorageResult<StoredObject>;

    /// Direct children of a folder, ordered by name. Does not recurse.
    async fn list(&self, query: &ListingQuery) -> StorageResult<FolderListing>;

    /// Check if an image exists
    async fn exists(&self, location: &Location) -> StorageResult<bool>;

    /// Check the backend is reachable and writable.
    async fn health_check(&self) -> StorageResult<()>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_to_app_error() {
        let err: AppError = StorageError::NotFound("u1/avatars/x".to_string()).into();
        assert!(matches!(err, AppError::NotFound(_)));

        let err: AppError = StorageError::InvalidKey("bad".to_string()).into();
        assert!(matches!(err, AppError::InvalidPath(_)));

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: AppError = StorageError::from(io).into();
        assert!(matches!(err, AppError::StoreUnavailable(_)));

        let err: AppError = StorageError::Corrupt("short header".to_string()).into();
        assert!(matches!(err, AppError::StoreUnavailable(_)));
    }
}
