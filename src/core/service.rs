//! Catalog use cases
//!
//! Ties the image store and the item store together behind the four calls the
//! transport layer needs.

use crate::catalog::{FileItemStore, ItemStore};
use crate::error::{CatalogError, Result};
use crate::image::ImageStore;
use crate::item::{Item, ItemRecord};
use crate::validation;
use std::path::PathBuf;
use tracing::{debug, info};

/// Add and fetch catalog items and their images
pub struct CatalogService<S: ItemStore = FileItemStore> {
    items: S,
    images: ImageStore,
}

impl<S: ItemStore> CatalogService<S> {
    pub fn new(items: S, images: ImageStore) -> Self {
        CatalogService { items, images }
    }

    pub fn item_store(&self) -> &S {
        &self.items
    }

    pub fn image_store(&self) -> &ImageStore {
        &self.images
    }

    /// Store the image, then append an item referencing it
    ///
    /// If the append fails the stored blob stays behind unreferenced. That is
    /// harmless: blobs are content-addressed and a retry reuses the same one.
    pub fn add_item(&self, name: &str, category: &str, image: &[u8]) -> Result<Item> {
        validation::validate_new_item(name, category, image)?;

        let stored = self.images.store_detailed(image)?;
        debug!(
            file = %stored.file_name,
            reused = stored.already_existed,
            "Image ready for item"
        );

        let record = ItemRecord::new(name, category, stored.file_name);
        let id = self.items.insert(record.clone())?;
        info!(id, name = %record.name, category = %record.category, "item received");

        Ok(record.with_id(id))
    }

    pub fn get_items(&self) -> Result<Vec<Item>> {
        self.items.list()
    }

    pub fn get_item(&self, id: i64) -> Result<Item> {
        self.items.select(id)
    }

    /// Resolve an image name, falling back to the placeholder
    ///
    /// A well-formed name with no blob yields the default image path. Unsafe
    /// or malformed names are always rejected.
    pub fn get_image_path(&self, file_name: &str) -> Result<PathBuf> {
        match self.images.resolve(file_name) {
            Ok(path) => Ok(path),
            Err(CatalogError::ImageNotFound(missing)) => {
                debug!(path = %missing.display(), "Image not found, using default");
                Ok(self.images.default_image_path())
            }
            Err(e) => Err(e),
        }
    }
}
