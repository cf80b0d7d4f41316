//! Content-addressed image storage
//!
//! Blobs live flat under the image root, named `<sha256-hex>.jpg` after the
//! digest of their bytes. Identical uploads map to the same name, so storing
//! is idempotent and concurrent writers of the same content cannot corrupt
//! each other. Blobs are never rewritten once present.

use crate::error::{CatalogError, Result};
use crate::validation;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Extension given to every stored blob
pub const BLOB_EXTENSION: &str = "jpg";

/// Placeholder served for well-formed names with no blob behind them
pub const DEFAULT_IMAGE_NAME: &str = "default.jpg";

/// Result of storing an image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    /// Canonical blob name (`<sha256-hex>.jpg`)
    pub file_name: String,
    /// Size of the stored content in bytes
    pub size_bytes: u64,
    /// Whether a blob with this content was already present
    pub already_existed: bool,
}

/// Image blob store rooted at one directory
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
    default_image: String,
}

impl ImageStore {
    /// Open an image store at `root`, creating the directory if needed
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        Self::with_default_image(root, DEFAULT_IMAGE_NAME)
    }

    /// Open an image store with a custom placeholder file name
    pub fn with_default_image<P: AsRef<Path>>(root: P, default_image: &str) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(|e| CatalogError::io(&root, e))?;

        let store = ImageStore {
            root,
            default_image: default_image.to_string(),
        };

        if !store.default_image_path().is_file() {
            warn!(
                path = %store.default_image_path().display(),
                "Default image is missing; fallbacks will point at a nonexistent file"
            );
        }
        info!(path = %store.root.display(), "Initialized image store");

        Ok(store)
    }

    /// Image root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the placeholder image
    pub fn default_image_path(&self) -> PathBuf {
        self.root.join(&self.default_image)
    }

    /// Hex SHA-256 digest of `data`
    pub fn digest(data: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(data);
        hex::encode(hasher.finalize())
    }

    /// Canonical blob name for `data`
    pub fn file_name_for(data: &[u8]) -> String {
        format!("{}.{}", Self::digest(data), BLOB_EXTENSION)
    }

    /// Store `data` and return its canonical file name
    pub fn store(&self, data: &[u8]) -> Result<String> {
        self.store_detailed(data).map(|stored| stored.file_name)
    }

    /// Store `data`, reporting whether the blob was already present
    ///
    /// New blobs are written to a temp file in the image root and renamed
    /// into place, so a reader never sees a partially written image.
    pub fn store_detailed(&self, data: &[u8]) -> Result<StoredImage> {
        let file_name = Self::file_name_for(data);
        let path = self.root.join(&file_name);

        if self.blob_exists(&path)? {
            debug!(file = %file_name, "Image already stored");
            return Ok(StoredImage {
                file_name,
                size_bytes: data.len() as u64,
                already_existed: true,
            });
        }

        let mut tmp =
            NamedTempFile::new_in(&self.root).map_err(|e| CatalogError::io(&self.root, e))?;
        tmp.write_all(data)
            .map_err(|e| CatalogError::io(tmp.path(), e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| CatalogError::io(tmp.path(), e))?;

        if let Err(e) = tmp.persist(&path) {
            // another writer may have won the race with identical bytes
            if self.blob_exists(&path)? {
                debug!(file = %file_name, "Image stored concurrently");
                return Ok(StoredImage {
                    file_name,
                    size_bytes: data.len() as u64,
                    already_existed: true,
                });
            }
            return Err(CatalogError::io(&path, e.error));
        }

        info!(file = %file_name, size = data.len(), "Stored image");

        Ok(StoredImage {
            file_name,
            size_bytes: data.len() as u64,
            already_existed: false,
        })
    }

    /// Resolve an externally supplied file name to a blob path
    ///
    /// Fails with `InvalidPath` when the name escapes the root or lacks a
    /// `.jpg`/`.jpeg` suffix, and with `ImageNotFound` when the name is
    /// well-formed but no blob exists.
    pub fn resolve(&self, file_name: &str) -> Result<PathBuf> {
        let path = validation::resolve_image_name(&self.root, file_name).map_err(|e| {
            warn!(file = %file_name, error = %e, "Rejected image path");
            e
        })?;

        if !self.blob_exists(&path)? {
            return Err(CatalogError::ImageNotFound(path));
        }

        Ok(path)
    }

    /// Whether a regular file exists at `path`
    fn blob_exists(&self, path: &Path) -> Result<bool> {
        match fs::metadata(path) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) if is_not_a_directory(&e) => Ok(false),
            Err(e) => Err(CatalogError::io(path, e)),
        }
    }
}

// ENOTDIR: a leading component of the name is a plain file
#[cfg(unix)]
fn is_not_a_directory(e: &std::io::Error) -> bool {
    const ENOTDIR: i32 = 20;
    e.raw_os_error() == Some(ENOTDIR)
}

#[cfg(not(unix))]
fn is_not_a_directory(_e: &std::io::Error) -> bool {
    false
}
