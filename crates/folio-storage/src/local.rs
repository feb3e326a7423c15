use crate::namespace::{ListingQuery, Location};
use crate::traits::{Storage, StorageError, StorageResult, StoredObject};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::{BufMut, Bytes, BytesMut};
use chrono::{DateTime, Utc};
use folio_core::{FolderListing, ImageName, ListingEntry};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use uuid::Uuid;

/// Leading bytes of every object file.
const MAGIC: &[u8; 6] = b"FOLIO\x01";
/// Magic plus the big-endian content type length.
const FIXED_HEADER_LEN: usize = MAGIC.len() + 2;

/// Local filesystem storage implementation
///
/// Each image is one file at `{base_path}/{owner}/{folder}/{name}` holding a short
/// header (magic, content type) followed by the image bytes. Writes land in a
/// hidden temporary file next to the target and are renamed over it, so a
/// reader holding the old file keeps reading the old content.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage instance rooted at `base_path` (e.g. "./data/images").
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Convert storage key to filesystem path with security validation
    ///
    /// Keys come from validated locations; this rejects anything that could
    /// still escape the base directory.
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        if storage_key.contains("..") || storage_key.starts_with('/') || storage_key.contains('\0')
        {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }

        Ok(storage_key
            .split('/')
            .filter(|segment| !segment.is_empty())
            .fold(self.base_path.clone(), |path, segment| path.join(segment)))
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Hidden sibling of `path`; unique per write so concurrent writers never share one.
    fn temp_path(path: &Path) -> PathBuf {
        path.with_file_name(format!(".{}.tmp", Uuid::new_v4().simple()))
    }

    async fn write_atomically(path: &Path, temp: &Path, contents: &[u8]) -> StorageResult<()> {
        let mut file = fs::File::create(temp).await.map_err(|e| {
            StorageError::BackendError(format!("Failed to create file {}: {}", temp.display(), e))
        })?;

        file.write_all(contents).await.map_err(|e| {
            StorageError::BackendError(format!("Failed to write file {}: {}", temp.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::BackendError(format!("Failed to sync file {}: {}", temp.display(), e))
        })?;
        drop(file);

        fs::rename(temp, path).await.map_err(|e| {
            StorageError::BackendError(format!(
                "Failed to move {} into place: {}",
                path.display(),
                e
            ))
        })
    }
}

fn encode_envelope(content_type: &str, data: &[u8]) -> StorageResult<Bytes> {
    let content_type_len = u16::try_from(content_type.len()).map_err(|_| {
        StorageError::BackendError(format!("Content type too long: {}", content_type.len()))
    })?;

    let mut buf = BytesMut::with_capacity(FIXED_HEADER_LEN + content_type.len() + data.len());
    buf.put_slice(MAGIC);
    buf.put_u16(content_type_len);
    buf.put_slice(content_type.as_bytes());
    buf.put_slice(data);
    Ok(buf.freeze())
}

/// Parse the fixed header; returns the content type length.
fn parse_fixed_header(header: &[u8], key: &str) -> StorageResult<usize> {
    if header.len() < FIXED_HEADER_LEN || header[..MAGIC.len()] != MAGIC[..] {
        return Err(StorageError::Corrupt(format!("{} has no object header", key)));
    }
    Ok(u16::from_be_bytes([header[MAGIC.len()], header[MAGIC.len() + 1]]) as usize)
}

fn decode_envelope(raw: Bytes, key: &str) -> StorageResult<(String, Bytes)> {
    let content_type_len = parse_fixed_header(&raw, key)?;
    let body_start = FIXED_HEADER_LEN + content_type_len;
    if raw.len() < body_start {
        return Err(StorageError::Corrupt(format!("{} has a truncated header", key)));
    }
    let content_type = std::str::from_utf8(&raw[FIXED_HEADER_LEN..body_start])
        .map_err(|_| StorageError::Corrupt(format!("{} has a non UTF-8 content type", key)))?
        .to_string();
    Ok((content_type, raw.slice(body_start..)))
}

fn modified_at(metadata: &std::fs::Metadata) -> DateTime<Utc> {
    metadata
        .modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now())
}

/// Content type and body length of one object file, reading only its header.
async fn read_entry(path: &Path, key: &str) -> StorageResult<(String, u64, DateTime<Utc>)> {
    let mut file = fs::File::open(path).await?;
    let metadata = file.metadata().await?;

    let mut fixed = [0u8; FIXED_HEADER_LEN];
    file.read_exact(&mut fixed).await.map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => StorageError::Corrupt(format!("{} is truncated", key)),
        _ => StorageError::IoError(e),
    })?;
    let content_type_len = parse_fixed_header(&fixed, key)?;

    let mut content_type = vec![0u8; content_type_len];
    file.read_exact(&mut content_type).await.map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => StorageError::Corrupt(format!("{} is truncated", key)),
        _ => StorageError::IoError(e),
    })?;
    let content_type = String::from_utf8(content_type)
        .map_err(|_| StorageError::Corrupt(format!("{} has a non UTF-8 content type", key)))?;

    let header_len = (FIXED_HEADER_LEN + content_type_len) as u64;
    Ok((
        content_type,
        metadata.len().saturating_sub(header_len),
        modified_at(&metadata),
    ))
}

#[async_trait]
impl Storage for LocalStorage {
    async fn put(
        &self,
        location: &Location,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<()> {
        let key = location.key();
        let path = self.key_to_path(&key)?;
        let size = data.len();

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let envelope = encode_envelope(content_type, &data)?;
        let temp = Self::temp_path(&path);
        if let Err(e) = Self::write_atomically(&path, &temp, &envelope).await {
            if let Err(cleanup) = fs::remove_file(&temp).await {
                if cleanup.kind() != ErrorKind::NotFound {
                    tracing::warn!(
                        path = %temp.display(),
                        error = %cleanup,
                        "Failed to remove temporary upload file"
                    );
                }
            }
            return Err(e);
        }

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = size,
            content_type = %content_type,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage put successful"
        );

        Ok(())
    }

    async fn get(&self, location: &Location) -> StorageResult<StoredObject> {
        let key = location.key();
        let path = self.key_to_path(&key)?;
        let start = std::time::Instant::now();

        // Read through one handle: a concurrent rename swaps the directory entry,
        // not the file this handle points at.
        let mut file = match fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StorageError::NotFound(key));
            }
            Err(e) => return Err(StorageError::IoError(e)),
        };
        let metadata = file.metadata().await?;
        if !metadata.is_file() {
            return Err(StorageError::NotFound(key));
        }

        let mut raw = Vec::with_capacity(metadata.len() as usize);
        file.read_to_end(&mut raw).await?;
        let (content_type, bytes) = decode_envelope(Bytes::from(raw), &key)?;

        tracing::debug!(
            path = %path.display(),
            key = %key,
            size_bytes = bytes.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage get successful"
        );

        Ok(StoredObject {
            bytes,
            content_type,
            last_modified: modified_at(&metadata),
        })
    }

    async fn list(&self, query: &ListingQuery) -> StorageResult<FolderListing> {
        let prefix = query.prefix();
        let dir = self.key_to_path(&prefix)?;

        let mut reader = match fs::read_dir(&dir).await {
            Ok(reader) => reader,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StorageError::NotFound(prefix));
            }
            Err(e) => return Err(StorageError::IoError(e)),
        };

        let mut entries = Vec::new();
        while let Some(entry) = reader.next_entry().await? {
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            // Hidden names are in-flight temporary files.
            if name.starts_with('.') || ImageName::parse(name.as_str()).is_err() {
                continue;
            }
            if !entry.file_type().await?.is_file() {
                continue;
            }

            let key = format!("{}{}", prefix, name);
            match read_entry(&entry.path(), &key).await {
                Ok((content_type, size, last_modified)) => entries.push(ListingEntry {
                    name,
                    size,
                    content_type,
                    last_modified,
                    url: None,
                }),
                Err(StorageError::IoError(e)) if e.kind() == ErrorKind::NotFound => continue,
                Err(StorageError::Corrupt(msg)) => {
                    tracing::warn!(key = %key, reason = %msg, "Skipping unreadable object in listing");
                }
                Err(e) => return Err(e),
            }
        }

        if entries.is_empty() {
            return Err(StorageError::NotFound(prefix));
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        let folder = query.folder();
        Ok(FolderListing {
            owner: folder.owner.to_string(),
            folder: folder.folder.to_string(),
            url: None,
            entries,
        })
    }

    async fn exists(&self, location: &Location) -> StorageResult<bool> {
        let path = self.key_to_path(&location.key())?;
        Ok(fs::try_exists(&path).await?)
    }

    async fn health_check(&self) -> StorageResult<()> {
        let metadata = fs::metadata(&self.base_path).await.map_err(|e| {
            StorageError::BackendError(format!(
                "Storage directory {} unavailable: {}",
                self.base_path.display(),
                e
            ))
        })?;
        if !metadata.is_dir() {
            return Err(StorageError::BackendError(format!(
                "{} is not a directory",
                self.base_path.display()
            )));
        }
        if metadata.permissions().readonly() {
            return Err(StorageError::BackendError(format!(
                "{} is read-only",
                self.base_path.display()
            )));
        }
        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::{resolve_listing, resolve_read};
    use std::sync::Arc;

    async fn storage() -> (tempfile::TempDir, LocalStorage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();
        (dir, storage)
    }

    #[tokio::test]
    async fn test_put_then_get_round_trip() {
        let (_dir, storage) = storage().await;
        let location = resolve_read("u1", "avatars", "cat.png").unwrap();

        storage
            .put(&location, Bytes::from_static(b"\x89PNGdata"), "image/png")
            .await
            .unwrap();

        let object = storage.get(&location).await.unwrap();
        assert_eq!(object.bytes, Bytes::from_static(b"\x89PNGdata"));
        assert_eq!(object.content_type, "image/png");
        assert_eq!(object.size(), 8);
        assert!(storage.exists(&location).await.unwrap());
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let (_dir, storage) = storage().await;
        let location = resolve_read("u1", "avatars", "cat.png").unwrap();

        storage
            .put(&location, Bytes::from_static(b"first"), "image/png")
            .await
            .unwrap();
        storage
            .put(&location, Bytes::from_static(b"second"), "image/gif")
            .await
            .unwrap();

        let object = storage.get(&location).await.unwrap();
        assert_eq!(object.bytes, Bytes::from_static(b"second"));
        assert_eq!(object.content_type, "image/gif");
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let (_dir, storage) = storage().await;
        let location = resolve_read("u1", "missing-folder", "x").unwrap();
        assert!(matches!(
            storage.get(&location).await,
            Err(StorageError::NotFound(_))
        ));
        assert!(!storage.exists(&location).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_sorted_and_skips_hidden_files() {
        let (dir, storage) = storage().await;
        for name in ["b.png", "a.png"] {
            let location = resolve_read("u1", "avatars", name).unwrap();
            storage
                .put(&location, Bytes::from_static(b"img"), "image/png")
                .await
                .unwrap();
        }
        let folder_dir = dir.path().join("u1").join("avatars");
        std::fs::write(folder_dir.join(".a.png.1234.tmp"), b"partial").unwrap();
        std::fs::create_dir(folder_dir.join("nested")).unwrap();

        let listing = storage
            .list(&resolve_listing("u1", "avatars").unwrap())
            .await
            .unwrap();
        assert_eq!(listing.names(), vec!["a.png", "b.png"]);
        assert_eq!(listing.owner, "u1");
        assert_eq!(listing.folder, "avatars");
        assert_eq!(listing.entries[0].size, 3);
        assert_eq!(listing.entries[0].content_type, "image/png");
    }

    #[tokio::test]
    async fn test_list_missing_or_empty_folder_is_not_found() {
        let (dir, storage) = storage().await;
        let query = resolve_listing("u1", "avatars").unwrap();
        assert!(matches!(
            storage.list(&query).await,
            Err(StorageError::NotFound(_))
        ));

        std::fs::create_dir_all(dir.path().join("u1").join("avatars")).unwrap();
        assert!(matches!(
            storage.list(&query).await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_owners_are_isolated() {
        let (_dir, storage) = storage().await;
        let mine = resolve_read("u1", "avatars", "cat.png").unwrap();
        storage
            .put(&mine, Bytes::from_static(b"img"), "image/png")
            .await
            .unwrap();

        let theirs = resolve_read("u2", "avatars", "cat.png").unwrap();
        assert!(matches!(
            storage.get(&theirs).await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_reported() {
        let (dir, storage) = storage().await;
        let folder_dir = dir.path().join("u1").join("avatars");
        std::fs::create_dir_all(&folder_dir).unwrap();
        std::fs::write(folder_dir.join("raw.png"), b"not an envelope").unwrap();

        let location = resolve_read("u1", "avatars", "raw.png").unwrap();
        assert!(matches!(
            storage.get(&location).await,
            Err(StorageError::Corrupt(_))
        ));
    }

    #[tokio::test]
    async fn test_concurrent_writes_never_tear() {
        let (_dir, storage) = storage().await;
        let storage = Arc::new(storage);
        let location = resolve_read("u1", "race", "same.png").unwrap();

        let payloads: Vec<Bytes> = (0u8..4)
            .map(|i| Bytes::from(vec![i; 64 * 1024]))
            .collect();
        storage
            .put(&location, payloads[0].clone(), "image/png")
            .await
            .unwrap();

        let mut tasks = Vec::new();
        for payload in payloads.iter().cloned() {
            let storage = storage.clone();
            let location = location.clone();
            tasks.push(tokio::spawn(async move {
                for _ in 0..5 {
                    storage
                        .put(&location, payload.clone(), "image/png")
                        .await
                        .unwrap();
                }
            }));
        }
        for _ in 0..4 {
            let storage = storage.clone();
            let location = location.clone();
            let payloads = payloads.clone();
            tasks.push(tokio::spawn(async move {
                for _ in 0..20 {
                    let object = storage.get(&location).await.unwrap();
                    assert!(payloads.contains(&object.bytes), "torn read");
                }
            }));
        }
        for result in futures::future::join_all(tasks).await {
            result.unwrap();
        }

        let listing = storage
            .list(&resolve_listing("u1", "race").unwrap())
            .await
            .unwrap();
        assert_eq!(listing.names(), vec!["same.png"]);
    }

    #[tokio::test]
    async fn test_key_to_path_rejects_escape() {
        let (_dir, storage) = storage().await;
        assert!(storage.key_to_path("../etc/passwd").is_err());
        assert!(storage.key_to_path("/etc/passwd").is_err());
        assert!(storage.health_check().await.is_ok());
    }
}
