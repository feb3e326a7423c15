pub mod image;
pub mod namespace;

pub use image::{FolderListing, ListingEntry, RequestOutcome, StatusResponse, UploadResponse};
pub use namespace::{
    validate_segment, Folder, FolderAddress, ImageAddress, ImageName, Owner, SegmentError,
};
