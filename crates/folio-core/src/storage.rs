//! Key-addressed object stores for page images and text fragments.
//!
//! [`ObjectStore`] is the capability the projector and the image proxy
//! consume: a key-based `get` returning either nothing or a
//! [`StoredObject`] with its bytes, content type, and entity tag.
//!
//! Two backends are provided:
//!
//! - [`FsObjectStore`] -- a directory on disk, one file per key
//! - [`MemoryObjectStore`] -- an in-memory map, used for fixtures and tests

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use sha2::{Digest, Sha256};

/// Content type reported when an object carries no type metadata.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Number of hex digits of the SHA-256 digest used as the entity tag.
const ETAG_HEX_LEN: usize = 32;

/// Errors that can occur when reading from an object store.
///
/// A missing key is not an error; `get` returns `Ok(None)` for it.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The key is empty, absolute, or escapes the store.
    #[error("invalid object key: {0}")]
    InvalidKey(String),

    /// The backend failed to read an existing object.
    #[error("object store I/O error for {key}: {source}")]
    Io {
        /// The key being read.
        key: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

/// An object fetched from a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    body: Vec<u8>,
    content_type: Option<String>,
    etag: String,
}

impl StoredObject {
    /// Wrap raw bytes, computing the entity tag from the content.
    pub fn new(body: Vec<u8>, content_type: Option<String>) -> Self {
        let etag = compute_etag(&body);
        Self {
            body,
            content_type,
            etag,
        }
    }

    /// The object's bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    /// Consume the object, returning its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.body
    }

    /// The object's bytes decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Stored content type metadata, if any.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Stored content type, or [`DEFAULT_CONTENT_TYPE`].
    pub fn content_type_or_default(&self) -> &str {
        self.content_type.as_deref().unwrap_or(DEFAULT_CONTENT_TYPE)
    }

    /// Quoted entity tag suitable for an `ETag` header.
    pub fn etag(&self) -> &str {
        &self.etag
    }

    /// Size of the body in bytes.
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Whether the body is empty.
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// The object as a `data:` URL with a base64 payload.
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.content_type_or_default(),
            BASE64_STANDARD.encode(&self.body)
        )
    }
}

/// A key-addressed, read-only object store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch the object stored under `key`.
    ///
    /// Returns `Ok(None)` when no object exists under the key.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidKey`] for keys that could escape the
    /// store, or [`StorageError::Io`] if an existing object cannot be read.
    async fn get(&self, key: &str) -> Result<Option<StoredObject>, StorageError>;
}

/// Reject keys that are empty, absolute, or contain `..` segments.
///
/// # Errors
///
/// Returns [`StorageError::InvalidKey`] describing the rejected key.
pub fn validate_key(key: &str) -> Result<&str, StorageError> {
    let invalid = key.is_empty()
        || key.starts_with('/')
        || key.contains('\\')
        || key.contains('\0')
        || key.split('/').any(|segment| segment == ".." || segment.is_empty());
    if invalid {
        return Err(StorageError::InvalidKey(key.to_owned()));
    }
    Ok(key)
}

/// Guess a content type from a key's extension.
pub fn content_type_for(key: &str) -> Option<&'static str> {
    let (_, ext) = key.rsplit_once('.')?;
    let content_type = match ext.to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "svg" => "image/svg+xml",
        "tif" | "tiff" => "image/tiff",
        "txt" => "text/plain; charset=utf-8",
        "md" => "text/markdown; charset=utf-8",
        "html" | "htm" => "text/html; charset=utf-8",
        "json" => "application/json",
        "pdf" => "application/pdf",
        _ => return None,
    };
    Some(content_type)
}

fn compute_etag(body: &[u8]) -> String {
    let digest = hex::encode(Sha256::digest(body));
    let short = digest.get(..ETAG_HEX_LEN).unwrap_or(&digest);
    format!("\"{short}\"")
}

// ---------------------------------------------------------------------------
// Filesystem backend
// ---------------------------------------------------------------------------

/// Object store backed by a directory; each key is a relative file path.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    /// Create a store rooted at `root`. The directory need not exist yet;
    /// every key resolves to a miss until it does.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn get(&self, key: &str) -> Result<Option<StoredObject>, StorageError> {
        let key = validate_key(key)?;
        let path = self.root.join(key);

        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Ok(None),
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StorageError::Io {
                    key: key.to_owned(),
                    source,
                });
            }
        }

        match tokio::fs::read(&path).await {
            Ok(body) => Ok(Some(StoredObject::new(
                body,
                content_type_for(key).map(str::to_owned),
            ))),
            // Removed between the metadata check and the read.
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io {
                key: key.to_owned(),
                source,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// In-memory backend
// ---------------------------------------------------------------------------

/// Object store held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryObjectStore {
    objects: BTreeMap<String, StoredObject>,
}

impl MemoryObjectStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `body` under `key`, guessing the content type from the key.
    pub fn insert(&mut self, key: impl Into<String>, body: impl Into<Vec<u8>>) {
        let key = key.into();
        let content_type = content_type_for(&key).map(str::to_owned);
        self.objects
            .insert(key, StoredObject::new(body.into(), content_type));
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with_object(mut self, key: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.insert(key, body);
        self
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the store holds no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn get(&self, key: &str) -> Result<Option<StoredObject>, StorageError> {
        let key = validate_key(key)?;
        Ok(self.objects.get(key).cloned())
    }
}
