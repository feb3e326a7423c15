//! Folio Processing Library
//!
//! Turns raw upload payloads into validated images: base64 or multipart bytes are
//! decoded, checked against the configured limits, and sniffed to find their real
//! content type. Nothing here performs I/O.

pub mod codec;
pub mod sniff;
pub mod validator;

pub use codec::{DecodedImage, DecodedUpload, ImageCodec, UploadForm, UploadPayload};
pub use sniff::{sniff, SniffedImage};
pub use validator::CodecError;
