//! Disk I/O for the catalog document

use crate::error::{CatalogError, Result};
use crate::item::ItemRecord;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Whole-file catalog document: `{ "items": [ ... ] }`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogDocument {
    #[serde(default, deserialize_with = "deserialize_items")]
    pub items: Vec<ItemRecord>,
}

// `"items": null` is treated like a missing key
fn deserialize_items<'de, D>(deserializer: D) -> std::result::Result<Vec<ItemRecord>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let items = Option::<Vec<ItemRecord>>::deserialize(deserializer)?;
    Ok(items.unwrap_or_default())
}

/// JSON catalog file on disk
///
/// Reads decode the whole document. Writes encode the whole document into a
/// sibling temp file and rename it over the target, so a reader sees either
/// the previous document or the new one.
#[derive(Debug, Clone)]
pub struct CatalogFile {
    path: PathBuf,
}

impl CatalogFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        CatalogFile {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Get file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding the catalog (`.` for a bare file name)
    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// Create the containing directory if it is missing
    pub fn ensure_dir(&self) -> Result<()> {
        let dir = self.dir();
        fs::create_dir_all(dir).map_err(|e| CatalogError::io(dir, e))
    }

    /// Read and decode the document
    ///
    /// A missing file or one holding only whitespace is an empty catalog.
    /// Anything else that fails to decode is an error.
    pub fn read(&self) -> Result<CatalogDocument> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(CatalogDocument::default());
            }
            Err(e) => return Err(CatalogError::io(&self.path, e)),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(CatalogDocument::default());
        }

        serde_json::from_slice(&bytes).map_err(|source| CatalogError::Decode {
            path: self.path.clone(),
            source,
        })
    }

    /// Encode and atomically replace the document
    pub fn write(&self, document: &CatalogDocument) -> Result<()> {
        let mut encoded = serde_json::to_vec(document).map_err(|source| CatalogError::Encode {
            path: self.path.clone(),
            source,
        })?;
        encoded.push(b'\n');

        let dir = self.dir();
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| CatalogError::io(dir, e))?;
        tmp.write_all(&encoded)
            .map_err(|e| CatalogError::io(tmp.path(), e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| CatalogError::io(tmp.path(), e))?;

        tmp.persist(&self.path)
            .map_err(|e| CatalogError::io(&self.path, e.error))?;

        Ok(())
    }
}
