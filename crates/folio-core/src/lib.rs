//! Folio Core Library
//!
//! Domain types shared by every Folio component: the error taxonomy, configuration,
//! namespace coordinates and the public URL scheme.

pub mod config;
pub mod constants;
pub mod error;
pub mod image_url;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{BaseConfig, Config, ImageServiceConfig, LogFormat};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use image_url::ImageUrlBuilder;
pub use models::{
    Folder, FolderAddress, FolderListing, ImageAddress, ImageName, ListingEntry, Owner,
    RequestOutcome, SegmentError, StatusResponse, UploadResponse,
};
pub use storage_types::StorageBackend;
