//! Service configuration
//!
//! Loaded from a TOML file; every field has a default so an empty file (or
//! no file at all) yields a working setup rooted in the current directory.

use crate::image::DEFAULT_IMAGE_NAME;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// JSON catalog file
    pub catalog_path: PathBuf,

    /// Directory holding image blobs
    pub image_dir: PathBuf,

    /// Placeholder file name inside `image_dir`
    pub default_image: String,

    /// Bind address for the HTTP server
    pub host: String,

    pub port: u16,

    /// Origin allowed by CORS
    pub front_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            catalog_path: PathBuf::from("items.json"),
            image_dir: PathBuf::from("images"),
            default_image: DEFAULT_IMAGE_NAME.to_string(),
            host: "127.0.0.1".to_string(),
            port: 9000,
            front_url: "http://localhost:3000".to_string(),
        }
    }
}

impl Config {
    /// Parse a TOML document
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Load a TOML config file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
