//! # Catalog Store - Item Catalog with Content-Addressed Images
//!
//! `catalog-store` persists named, categorized items together with a photo
//! and serves either back by identifier:
//!
//! - **Item catalog**: one JSON file, whole-file read-modify-write, writes
//!   serialized behind a lock and replaced atomically
//! - **Image store**: blobs named by the SHA-256 of their bytes, so identical
//!   uploads collapse to one file
//! - **Path safety**: image names from clients are cleaned and must stay
//!   inside the image directory
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use catalog_store::{CatalogBuilder, Result};
//!
//! # fn main() -> Result<()> {
//! let catalog = CatalogBuilder::new()
//!     .catalog_path("data/items.json")
//!     .image_dir("data/images")
//!     .build()?;
//!
//! let item = catalog.add_item("Phone X", "electronics", b"...jpeg bytes...")?;
//! assert_eq!(catalog.get_item(item.id as i64)?, item);
//!
//! // Missing-but-valid names fall back to the placeholder image
//! let path = catalog.get_image_path("0123.jpg")?;
//! # Ok(())
//! # }
//! ```

pub mod core;

#[cfg(feature = "server")]
pub mod http;

// Re-export core modules so crate:: paths in core resolve
pub use crate::core::{catalog, config, error, image, item, service, validation};

pub use crate::core::{
    catalog::{CatalogDocument, CatalogFile, FileItemStore, ItemStore},
    config::{Config, ConfigError},
    error::{CatalogError, ErrorKind, Result},
    image::{ImageStore, StoredImage, DEFAULT_IMAGE_NAME},
    item::{Item, ItemRecord},
    service::CatalogService,
};

use std::path::PathBuf;
use tracing::info;

/// Builder for a file-backed [`CatalogService`]
///
/// # Examples
///
/// ```rust,no_run
/// use catalog_store::{CatalogBuilder, Config};
///
/// # fn main() -> catalog_store::Result<()> {
/// // From explicit paths
/// let catalog = CatalogBuilder::new()
///     .catalog_path("/srv/catalog/items.json")
///     .image_dir("/srv/catalog/images")
///     .build()?;
///
/// // From a loaded config
/// let catalog = CatalogBuilder::from_config(&Config::default()).build()?;
/// # Ok(())
/// # }
/// ```
pub struct CatalogBuilder {
    catalog_path: PathBuf,
    image_dir: PathBuf,
    default_image: String,
}

impl CatalogBuilder {
    /// Create a builder with the default layout (`items.json`, `images/`)
    pub fn new() -> Self {
        Self::from_config(&Config::default())
    }

    /// Take storage paths from a config
    pub fn from_config(config: &Config) -> Self {
        CatalogBuilder {
            catalog_path: config.catalog_path.clone(),
            image_dir: config.image_dir.clone(),
            default_image: config.default_image.clone(),
        }
    }

    /// Set the catalog file path
    pub fn catalog_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.catalog_path = path.into();
        self
    }

    /// Set the image directory
    pub fn image_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.image_dir = dir.into();
        self
    }

    /// Set the placeholder image file name
    pub fn default_image<S: Into<String>>(mut self, name: S) -> Self {
        self.default_image = name.into();
        self
    }

    /// Open both stores and build the service
    pub fn build(self) -> Result<CatalogService> {
        info!(
            catalog = %self.catalog_path.display(),
            images = %self.image_dir.display(),
            "Building catalog service"
        );

        let items = FileItemStore::open(&self.catalog_path)?;
        let images = ImageStore::with_default_image(&self.image_dir, &self.default_image)?;

        Ok(CatalogService::new(items, images))
    }
}

impl Default for CatalogBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() -> Result<()> {
        let temp_dir = tempfile::TempDir::new().unwrap();

        let catalog = CatalogBuilder::new()
            .catalog_path(temp_dir.path().join("items.json"))
            .image_dir(temp_dir.path().join("images"))
            .default_image("placeholder.jpg")
            .build()?;

        assert!(temp_dir.path().join("images").is_dir());
        assert_eq!(
            catalog.image_store().default_image_path(),
            temp_dir.path().join("images/placeholder.jpg")
        );
        assert_eq!(
            catalog.item_store().path(),
            temp_dir.path().join("items.json")
        );

        Ok(())
    }

    #[test]
    fn test_builder_from_config() -> Result<()> {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config = Config {
            catalog_path: temp_dir.path().join("db/items.json"),
            image_dir: temp_dir.path().join("img"),
            ..Config::default()
        };

        let catalog = CatalogBuilder::from_config(&config).build()?;
        catalog.add_item("jacket", "fashion", b"photo")?;

        assert!(temp_dir.path().join("db/items.json").is_file());
        assert_eq!(catalog.get_items()?.len(), 1);

        Ok(())
    }
}
