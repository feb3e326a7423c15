use folio_core::{AppError, SegmentError};

/// Upload payload validation errors
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Invalid folder {raw:?}: {reason}")]
    InvalidFolder { raw: String, reason: SegmentError },

    #[error("Invalid image name {raw:?}: {reason}")]
    InvalidName { raw: String, reason: SegmentError },

    #[error("Image is not valid base64: {0}")]
    InvalidEncoding(String),

    #[error("Image is empty")]
    EmptyImage,

    #[error("Image too large: {size} bytes (max: {max} bytes)")]
    TooLarge { size: usize, max: usize },

    #[error("Unsupported media type: {content_type} (allowed: {allowed:?})")]
    UnsupportedMediaType {
        content_type: String,
        allowed: Vec<String>,
    },
}

impl From<CodecError> for AppError {
    fn from(err: CodecError) -> Self {
        let message = err.to_string();
        match err {
            CodecError::InvalidFolder { .. } => AppError::InvalidFolder(message),
            CodecError::InvalidName { .. } => AppError::InvalidPath(message),
            CodecError::InvalidEncoding(_) => AppError::InvalidEncoding(message),
            CodecError::EmptyImage => AppError::EmptyImage(message),
            CodecError::TooLarge { .. } => AppError::PayloadTooLarge(message),
            CodecError::UnsupportedMediaType { .. } => AppError::UnsupportedMediaType(message),
        }
    }
}
