//! Error types for catalog and image storage

use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of a [`CatalogError`]
///
/// Callers branch on the kind instead of matching message text. The HTTP
/// adapter derives its status codes from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad caller input
    Validation,
    /// Requested item id is outside the catalog
    ItemNotFound,
    /// Well-formed image name with no blob behind it
    ImageNotFound,
    /// Image name rejected as unsafe or malformed
    InvalidPath,
    /// I/O, decode or encode failure on the backing store
    StorageIo,
}

impl ErrorKind {
    /// HTTP status code the transport layer should answer with
    pub fn http_status(self) -> u16 {
        match self {
            ErrorKind::Validation | ErrorKind::InvalidPath => 400,
            ErrorKind::ItemNotFound | ErrorKind::ImageNotFound => 404,
            ErrorKind::StorageIo => 500,
        }
    }
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Item not found: {0}")]
    ItemNotFound(i64),

    #[error("Image not found: {}", .0.display())]
    ImageNotFound(PathBuf),

    #[error("Invalid image path: {0}")]
    InvalidPath(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed catalog {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode catalog {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl CatalogError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::Validation(_) => ErrorKind::Validation,
            CatalogError::ItemNotFound(_) => ErrorKind::ItemNotFound,
            CatalogError::ImageNotFound(_) => ErrorKind::ImageNotFound,
            CatalogError::InvalidPath(_) => ErrorKind::InvalidPath,
            CatalogError::Io { .. } | CatalogError::Decode { .. } | CatalogError::Encode { .. } => {
                ErrorKind::StorageIo
            }
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CatalogError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            CatalogError::Validation("name is required".into()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(CatalogError::ItemNotFound(3).kind(), ErrorKind::ItemNotFound);
        assert_eq!(
            CatalogError::ImageNotFound(PathBuf::from("images/a.jpg")).kind(),
            ErrorKind::ImageNotFound
        );
        assert_eq!(
            CatalogError::InvalidPath("../x.jpg".into()).kind(),
            ErrorKind::InvalidPath
        );

        let io = CatalogError::io(
            "items.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(io.kind(), ErrorKind::StorageIo);

        let decode = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = CatalogError::Decode {
            path: PathBuf::from("items.json"),
            source: decode,
        };
        assert_eq!(err.kind(), ErrorKind::StorageIo);
    }

    #[test]
    fn test_http_status() {
        assert_eq!(ErrorKind::Validation.http_status(), 400);
        assert_eq!(ErrorKind::InvalidPath.http_status(), 400);
        assert_eq!(ErrorKind::ItemNotFound.http_status(), 404);
        assert_eq!(ErrorKind::ImageNotFound.http_status(), 404);
        assert_eq!(ErrorKind::StorageIo.http_status(), 500);
    }

    #[test]
    fn test_display_includes_path() {
        let err = CatalogError::ImageNotFound(PathBuf::from("images/missing.jpg"));
        assert!(err.to_string().contains("images/missing.jpg"));
    }
}
