//! Namespace coordinates.
//!
//! Every stored image is addressed by `(owner, folder, name)`. Each coordinate is
//! a validated segment: it can never contain a separator, a traversal sequence or
//! a NUL byte, so joining three segments with `/` is injective and two distinct
//! addresses never alias the same storage key.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};

use crate::constants::MAX_SEGMENT_LEN;

/// Why a raw string was refused as a namespace segment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SegmentError {
    #[error("segment is empty")]
    Empty,

    #[error("segment is {0} bytes long, the limit is {max}", max = MAX_SEGMENT_LEN)]
    TooLong(usize),

    #[error("segment contains a '..' traversal sequence")]
    Traversal,

    #[error("segment contains a path separator")]
    Separator,

    #[error("segment contains a NUL byte")]
    NullByte,

    #[error("segment starts with '.'")]
    Hidden,

    #[error("segment contains the disallowed character {0:?}")]
    InvalidCharacter(char),
}

fn is_segment_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '@' | '+' | '-')
}

/// Validate one path segment.
///
/// Checks run from the most specific to the most general so callers get the
/// most useful reason: `"../x"` is a traversal, not merely a bad character.
pub fn validate_segment(raw: &str) -> Result<(), SegmentError> {
    if raw.is_empty() {
        return Err(SegmentError::Empty);
    }
    if raw.len() > MAX_SEGMENT_LEN {
        return Err(SegmentError::TooLong(raw.len()));
    }
    if raw.contains('\0') {
        return Err(SegmentError::NullByte);
    }
    if raw.contains("..") {
        return Err(SegmentError::Traversal);
    }
    if raw.contains('/') || raw.contains('\\') {
        return Err(SegmentError::Separator);
    }
    if raw.starts_with('.') {
        return Err(SegmentError::Hidden);
    }
    if let Some(bad) = raw.chars().find(|c| !is_segment_char(*c)) {
        return Err(SegmentError::InvalidCharacter(bad));
    }
    Ok(())
}

macro_rules! segment_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            pub fn parse(raw: impl Into<String>) -> Result<Self, SegmentError> {
                let raw = raw.into();
                validate_segment(&raw)?;
                Ok(Self(raw))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = SegmentError;

            fn try_from(raw: String) -> Result<Self, Self::Error> {
                Self::parse(raw)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
                f.write_str(&self.0)
            }
        }
    };
}

segment_type!(
    /// Identity that partitions storage, taken from the caller's token.
    Owner
);
segment_type!(
    /// Grouping under an owner. Exists implicitly once an image is stored in it.
    Folder
);
segment_type!(
    /// Image identifier, unique within `(owner, folder)`.
    ImageName
);

/// Full address of one stored image.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageAddress {
    pub owner: Owner,
    pub folder: Folder,
    pub name: ImageName,
}

impl ImageAddress {
    pub fn new(owner: Owner, folder: Folder, name: ImageName) -> Self {
        Self {
            owner,
            folder,
            name,
        }
    }

    pub fn folder_address(&self) -> FolderAddress {
        FolderAddress::new(self.owner.clone(), self.folder.clone())
    }

    /// Storage key `owner/folder/name`.
    pub fn key(&self) -> String {
        format!("{}/{}/{}", self.owner, self.folder, self.name)
    }
}

impl Display for ImageAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.key())
    }
}

/// Address of a folder, used for listings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FolderAddress {
    pub owner: Owner,
    pub folder: Folder,
}

impl FolderAddress {
    pub fn new(owner: Owner, folder: Folder) -> Self {
        Self { owner, folder }
    }

    /// Key prefix `owner/folder/` shared by every image in the folder.
    pub fn prefix(&self) -> String {
        format!("{}/{}/", self.owner, self.folder)
    }

    pub fn image(&self, name: ImageName) -> ImageAddress {
        ImageAddress::new(self.owner.clone(), self.folder.clone(), name)
    }
}

impl Display for FolderAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}/{}", self.owner, self.folder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_segments() {
        for raw in ["u1", "avatars", "photo.png", "a-b_c@d+e", "2026.10.16"] {
            assert!(validate_segment(raw).is_ok(), "{raw} should be valid");
        }
    }

    #[test]
    fn test_rejects_traversal_and_separators() {
        assert_eq!(validate_segment(""), Err(SegmentError::Empty));
        assert_eq!(validate_segment(".."), Err(SegmentError::Traversal));
        assert_eq!(validate_segment("../etc"), Err(SegmentError::Traversal));
        assert_eq!(validate_segment("a..b"), Err(SegmentError::Traversal));
        assert_eq!(validate_segment("/abs"), Err(SegmentError::Separator));
        assert_eq!(validate_segment("a/b"), Err(SegmentError::Separator));
        assert_eq!(validate_segment("a\\b"), Err(SegmentError::Separator));
        assert_eq!(validate_segment("a\0b"), Err(SegmentError::NullByte));
        assert_eq!(validate_segment(".hidden"), Err(SegmentError::Hidden));
        assert_eq!(
            validate_segment("with space"),
            Err(SegmentError::InvalidCharacter(' '))
        );
        assert_eq!(
            validate_segment(&"x".repeat(MAX_SEGMENT_LEN + 1)),
            Err(SegmentError::TooLong(MAX_SEGMENT_LEN + 1))
        );
    }

    #[test]
    fn test_address_key_is_injective_over_segments() {
        let a = ImageAddress::new(
            Owner::parse("u1").unwrap(),
            Folder::parse("a").unwrap(),
            ImageName::parse("b.png").unwrap(),
        );
        let b = ImageAddress::new(
            Owner::parse("u1").unwrap(),
            Folder::parse("a.b").unwrap(),
            ImageName::parse("png").unwrap(),
        );
        assert_eq!(a.key(), "u1/a/b.png");
        assert_ne!(a.key(), b.key());
        assert_eq!(a.folder_address().prefix(), "u1/a/");
    }

    #[test]
    fn test_segment_deserialize_validates() {
        let ok: Result<Folder, _> = serde_json::from_str("\"avatars\"");
        assert!(ok.is_ok());
        let bad: Result<Folder, _> = serde_json::from_str("\"../x\"");
        assert!(bad.is_err());
    }
}
