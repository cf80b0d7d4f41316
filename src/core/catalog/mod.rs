//! Item catalog
//!
//! The catalog is a single JSON document holding every item record in
//! insertion order. There is no index and no incremental append: each insert
//! reads the whole document, appends one record and writes the whole document
//! back. That keeps the file consistent after every successful insert, at a
//! cost linear in catalog size, which is fine for the small catalogs this
//! store is meant for.
//!
//! Item ids are positional (1-based index at read time). Records are never
//! updated, removed or reordered, so an id stays valid for the life of the
//! file.

pub mod file;

pub use file::{CatalogDocument, CatalogFile};

use crate::error::{CatalogError, Result};
use crate::item::{number_records, Item, ItemRecord};
use parking_lot::RwLock;
use std::path::Path;
use tracing::{debug, info};

/// Storage backend for item records
///
/// Implementations must make `insert` safe under concurrent callers: no
/// successfully inserted record may be lost.
pub trait ItemStore: Send + Sync {
    /// Append a record and return the positional id it was given
    fn insert(&self, record: ItemRecord) -> Result<u64>;

    /// All items in insertion order, numbered from 1
    fn list(&self) -> Result<Vec<Item>>;

    /// The item at position `id`
    ///
    /// Fails with `ItemNotFound` when `id <= 0` or past the end.
    fn select(&self, id: i64) -> Result<Item> {
        if id <= 0 {
            return Err(CatalogError::ItemNotFound(id));
        }

        self.list()?
            .into_iter()
            .nth((id - 1) as usize)
            .ok_or(CatalogError::ItemNotFound(id))
    }
}

/// [`ItemStore`] backed by one JSON file
///
/// The file is owned by this value for its whole life. A read-write lock
/// serializes the read-modify-write cycle of `insert`; `list` takes the
/// shared side so it never observes a write in progress.
pub struct FileItemStore {
    file: RwLock<CatalogFile>,
}

impl FileItemStore {
    /// Open the catalog at `path`
    ///
    /// Creates the parent directory if needed. An existing file is decoded
    /// once so corruption is reported here rather than on the first request.
    /// The file itself is not created until the first insert.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = CatalogFile::new(path);
        file.ensure_dir()?;

        let document = file.read()?;
        info!(
            path = %file.path().display(),
            items = document.items.len(),
            "Opened item catalog"
        );

        Ok(FileItemStore {
            file: RwLock::new(file),
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> std::path::PathBuf {
        self.file.read().path().to_path_buf()
    }
}

impl ItemStore for FileItemStore {
    fn insert(&self, record: ItemRecord) -> Result<u64> {
        let file = self.file.write();

        let mut document = file.read()?;
        document.items.push(record);
        file.write(&document)?;

        let id = document.items.len() as u64;
        info!(id, path = %file.path().display(), "Appended item to catalog");
        Ok(id)
    }

    fn list(&self) -> Result<Vec<Item>> {
        let file = self.file.read();
        let document = file.read()?;
        debug!(items = document.items.len(), "Read item catalog");
        Ok(number_records(document.items))
    }
}
