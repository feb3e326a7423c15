//! Namespace resolution.
//!
//! Maps request coordinates to storage locations. Raw strings coming from a
//! request path are validated here, before any backend is touched; a rejected
//! segment is reported as `InvalidPath`.

use chrono::{DateTime, Utc};
use folio_core::{AppError, Folder, FolderAddress, ImageAddress, ImageName, Owner};
use uuid::Uuid;

/// Where one image lives in a store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    address: ImageAddress,
}

impl Location {
    pub fn new(address: ImageAddress) -> Self {
        Self { address }
    }

    pub fn address(&self) -> &ImageAddress {
        &self.address
    }

    pub fn key(&self) -> String {
        self.address.key()
    }
}

/// Opaque listing request for the direct children of one folder.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListingQuery {
    folder: FolderAddress,
}

impl ListingQuery {
    pub fn new(folder: FolderAddress) -> Self {
        Self { folder }
    }

    pub fn folder(&self) -> &FolderAddress {
        &self.folder
    }

    pub fn prefix(&self) -> String {
        self.folder.prefix()
    }
}

fn invalid_path(what: &str, raw: &str, err: folio_core::SegmentError) -> AppError {
    AppError::InvalidPath(format!("invalid {} {:?}: {}", what, raw, err))
}

/// Name for an upload that did not bring one: upload time to the millisecond,
/// then 16 random hex characters, then the format's extension.
///
/// Uniqueness is probabilistic; the store is not consulted.
pub fn generate_image_name(now: DateTime<Utc>, extension: &str) -> String {
    let random = Uuid::new_v4().simple().to_string();
    let extension: String = extension
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    let stem = format!("{}-{}", now.format("%Y%m%d%H%M%S%3f"), &random[..16]);
    if extension.is_empty() {
        stem
    } else {
        format!("{}.{}", stem, extension)
    }
}

/// Location for an upload. A missing name is generated from the current time.
pub fn resolve_write(
    owner: &Owner,
    folder: &Folder,
    name: Option<&ImageName>,
    extension: &str,
) -> Result<Location, AppError> {
    let name = match name {
        Some(name) => name.clone(),
        None => {
            let generated = generate_image_name(Utc::now(), extension);
            ImageName::parse(generated.as_str())
                .map_err(|e| AppError::Internal(format!("generated name {:?}: {}", generated, e)))?
        }
    };
    Ok(Location::new(ImageAddress::new(
        owner.clone(),
        folder.clone(),
        name,
    )))
}

/// Location for a read of `owner/folder/name` taken from a request path.
pub fn resolve_read(owner: &str, folder: &str, name: &str) -> Result<Location, AppError> {
    let owner = Owner::parse(owner).map_err(|e| invalid_path("owner", owner, e))?;
    let folder = Folder::parse(folder).map_err(|e| invalid_path("folder", folder, e))?;
    let name = ImageName::parse(name).map_err(|e| invalid_path("image name", name, e))?;
    Ok(Location::new(ImageAddress::new(owner, folder, name)))
}

/// Listing of `owner/folder` taken from a request path.
pub fn resolve_listing(owner: &str, folder: &str) -> Result<ListingQuery, AppError> {
    let owner = Owner::parse(owner).map_err(|e| invalid_path("owner", owner, e))?;
    let folder = Folder::parse(folder).map_err(|e| invalid_path("folder", folder, e))?;
    Ok(ListingQuery::new(FolderAddress::new(owner, folder)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_generate_image_name_shape() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 15).unwrap()
            + chrono::Duration::milliseconds(123);
        let name = generate_image_name(now, "PNG");
        assert!(name.starts_with("20261016093015123-"), "{name}");
        assert!(name.ends_with(".png"));
        let random = &name["20261016093015123-".len()..name.len() - ".png".len()];
        assert_eq!(random.len(), 16);
        assert!(random.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(ImageName::parse(name.as_str()).is_ok());
    }

    #[test]
    fn test_generated_names_differ() {
        let now = Utc::now();
        assert_ne!(generate_image_name(now, "png"), generate_image_name(now, "png"));
    }

    #[test]
    fn test_extension_is_sanitized() {
        let name = generate_image_name(Utc::now(), "../x");
        assert!(name.ends_with(".x"));
        let bare = generate_image_name(Utc::now(), "");
        assert!(!bare.contains('.'));
    }

    #[test]
    fn test_resolve_write_keeps_given_name() {
        let owner = Owner::parse("u1").unwrap();
        let folder = Folder::parse("avatars").unwrap();
        let name = ImageName::parse("me.png").unwrap();
        let location = resolve_write(&owner, &folder, Some(&name), "png").unwrap();
        assert_eq!(location.key(), "u1/avatars/me.png");

        let generated = resolve_write(&owner, &folder, None, "jpg").unwrap();
        assert!(generated.key().starts_with("u1/avatars/"));
        assert!(generated.key().ends_with(".jpg"));
    }

    #[test]
    fn test_resolve_read_rejects_traversal() {
        assert!(resolve_read("u1", "avatars", "x.png").is_ok());
        for (owner, folder, name) in [
            ("u1", "..", "x"),
            ("u1", "avatars", "../x"),
            ("u1", "/etc", "passwd"),
            ("u1", "a\0b", "x"),
            ("", "avatars", "x"),
            ("u1", "avatars", ""),
        ] {
            let err = resolve_read(owner, folder, name).unwrap_err();
            assert!(matches!(err, AppError::InvalidPath(_)), "{owner}/{folder}/{name}");
        }
    }

    #[test]
    fn test_resolve_listing() {
        let query = resolve_listing("u1", "avatars").unwrap();
        assert_eq!(query.prefix(), "u1/avatars/");
        assert!(matches!(
            resolve_listing("u1", "..").unwrap_err(),
            AppError::InvalidPath(_)
        ));
    }
}
