//! Folio Storage Library
//!
//! Durable persistence for images, addressed by namespace coordinates.
//!
//! # Storage key format
//!
//! Every image lives under `{owner}/{folder}/{name}`. Keys are never assembled by
//! callers: they come from a [`Location`] produced by the [`namespace`] resolver,
//! whose segments are validated so that a key can neither escape the store root
//! nor alias another image.
//!
//! # Consistency
//!
//! `put` is atomic per location. A concurrent reader sees the previous content,
//! no content, or the complete new content; never a mix. Writes to distinct
//! locations never wait on each other.

pub mod factory;
pub mod local;
pub mod memory;
pub mod namespace;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use folio_core::StorageBackend;
pub use local::LocalStorage;
pub use memory::MemoryStorage;
pub use namespace::{
    generate_image_name, resolve_listing, resolve_read, resolve_write, ListingQuery, Location,
};
pub use traits::{Storage, StorageError, StorageResult, StoredObject};
