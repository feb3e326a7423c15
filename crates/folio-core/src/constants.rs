//! Constants shared by every Folio crate.

/// API base path prefix (version-independent)
pub const API_BASE: &str = "/api";

/// Current API version segment.
pub const API_VERSION: &str = "v0";

/// Prefix under which the image routes are mounted. Image URLs returned to
/// callers are built on top of it.
pub const API_PREFIX: &str = "/api/v0/images";

/// Folder used when an upload does not name one.
pub const DEFAULT_FOLDER: &str = "general";

/// Longest accepted owner, folder or image name segment, in bytes.
pub const MAX_SEGMENT_LEN: usize = 255;

/// Service identity reported by `/status`.
pub const SERVICE_NAME: &str = "folio";
pub const SERVICE_CANONICAL_NAME: &str = "folio-image-service";
pub const SERVICE_DESCRIPTION: &str = "Authenticated image storage and retrieval";
