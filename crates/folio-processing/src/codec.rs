//! Upload payload codec.
//!
//! Both upload routes funnel into [`ImageCodec::decode`]: the transport only
//! decides which [`UploadPayload`] variant it builds.

use base64::{engine::general_purpose::STANDARD, Engine};
use bytes::Bytes;
use folio_core::{Folder, ImageName};

use crate::sniff::sniff;
use crate::validator::CodecError;

/// Raw image content as received.
#[derive(Debug, Clone)]
pub enum UploadPayload {
    /// File part of a multipart form, with the type the client declared for it.
    Multipart {
        bytes: Bytes,
        declared_type: Option<String>,
    },
    /// Base64 text from a JSON body, optionally wrapped in a `data:` URI.
    Base64(String),
}

/// Everything an upload request carries besides the caller's identity.
#[derive(Debug, Clone)]
pub struct UploadForm {
    pub folder: Option<String>,
    pub name: Option<String>,
    pub payload: UploadPayload,
}

#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub bytes: Bytes,
    pub content_type: &'static str,
    pub extension: &'static str,
    pub dimensions: Option<(u32, u32)>,
}

impl DecodedImage {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// A validated upload ready to be placed in the namespace.
#[derive(Debug, Clone)]
pub struct DecodedUpload {
    pub folder: Folder,
    pub name: Option<ImageName>,
    pub image: DecodedImage,
}

#[derive(Debug, Clone)]
pub struct ImageCodec {
    default_folder: Folder,
    max_image_bytes: usize,
    allowed_content_types: Vec<String>,
}

impl ImageCodec {
    pub fn new(
        default_folder: Folder,
        max_image_bytes: usize,
        allowed_content_types: Vec<String>,
    ) -> Self {
        Self {
            default_folder,
            max_image_bytes,
            allowed_content_types: allowed_content_types
                .into_iter()
                .map(|t| t.trim().to_lowercase())
                .collect(),
        }
    }

    pub fn max_image_bytes(&self) -> usize {
        self.max_image_bytes
    }

    /// Validate and decode one upload. Pure: no I/O, no side effects.
    ///
    /// Checks run in a fixed order and the first failure wins: folder, name,
    /// encoding, emptiness, size, then content type.
    pub fn decode(&self, form: UploadForm) -> Result<DecodedUpload, CodecError> {
        let folder = self.folder(form.folder)?;
        let name = form
            .name
            .filter(|n| !n.is_empty())
            .map(|raw| {
                ImageName::parse(raw.as_str())
                    .map_err(|reason| CodecError::InvalidName { raw, reason })
            })
            .transpose()?;

        let (bytes, declared_type) = match form.payload {
            UploadPayload::Multipart {
                bytes,
                declared_type,
            } => (bytes, declared_type),
            UploadPayload::Base64(text) => (self.decode_base64(&text)?, None),
        };

        if bytes.is_empty() {
            return Err(CodecError::EmptyImage);
        }
        if bytes.len() > self.max_image_bytes {
            return Err(CodecError::TooLarge {
                size: bytes.len(),
                max: self.max_image_bytes,
            });
        }

        let sniffed = sniff(&bytes).ok_or_else(|| CodecError::UnsupportedMediaType {
            content_type: declared_type
                .clone()
                .unwrap_or_else(|| "unknown".to_string()),
            allowed: self.allowed_content_types.clone(),
        })?;

        if !self
            .allowed_content_types
            .iter()
            .any(|t| t == sniffed.content_type)
        {
            return Err(CodecError::UnsupportedMediaType {
                content_type: sniffed.content_type.to_string(),
                allowed: self.allowed_content_types.clone(),
            });
        }

        if let Some(declared) = declared_type.as_deref() {
            if !declared.eq_ignore_ascii_case(sniffed.content_type) {
                tracing::debug!(
                    declared = %declared,
                    sniffed = %sniffed.content_type,
                    "Declared content type differs from content; using sniffed type"
                );
            }
        }

        Ok(DecodedUpload {
            folder,
            name,
            image: DecodedImage {
                bytes,
                content_type: sniffed.content_type,
                extension: sniffed.extension,
                dimensions: sniffed.dimensions,
            },
        })
    }

    fn folder(&self, raw: Option<String>) -> Result<Folder, CodecError> {
        match raw.filter(|f| !f.trim().is_empty()) {
            None => Ok(self.default_folder.clone()),
            Some(raw) => Folder::parse(raw.as_str())
                .map_err(|reason| CodecError::InvalidFolder { raw, reason }),
        }
    }

    fn decode_base64(&self, text: &str) -> Result<Bytes, CodecError> {
        let text = text.trim();
        let encoded = match text.strip_prefix("data:") {
            Some(rest) => match rest.split_once(";base64,") {
                Some((_, data)) => data,
                None => {
                    return Err(CodecError::InvalidEncoding(
                        "data URI is not base64 encoded".to_string(),
                    ))
                }
            },
            None => text,
        };

        // Four base64 characters carry three bytes; refuse before allocating.
        let max_encoded = self.max_image_bytes.div_ceil(3) * 4 + 4;
        if encoded.len() > max_encoded.saturating_add(encoded.len() / 76 * 2) {
            return Err(CodecError::TooLarge {
                size: encoded.len() / 4 * 3,
                max: self.max_image_bytes,
            });
        }

        let compact: String = encoded
            .chars()
            .filter(|c| !matches!(c, '\r' | '\n'))
            .collect();
        STANDARD
            .decode(compact.as_bytes())
            .map(Bytes::from)
            .map_err(|e| CodecError::InvalidEncoding(e.to_string()))
    }
}
