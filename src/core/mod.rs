//! Persistence core: item catalog, image store and the service joining them

pub mod catalog;
pub mod config;
pub mod error;
pub mod image;
pub mod item;
pub mod service;
pub mod validation;

pub use catalog::{FileItemStore, ItemStore};
pub use image::ImageStore;
pub use service::CatalogService;
