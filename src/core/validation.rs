//! Validation for item fields and image paths
//!
//! Item fields must be non-blank before anything touches the disk. Image
//! names arrive from the outside world and are checked lexically: the name
//! is joined onto the image root, cleaned, and must still sit beneath that
//! root. No filesystem access happens here, so symlinks are not followed.

use crate::error::{CatalogError, Result};
use std::path::{Component, Path, PathBuf};

/// File suffixes accepted when resolving an image name
pub const IMAGE_SUFFIXES: [&str; 2] = [".jpg", ".jpeg"];

/// Ensure a required text field is present
///
/// Whitespace-only values count as missing.
///
/// # Examples
///
/// ```
/// use catalog_store::validation::require_field;
///
/// assert!(require_field("name", "Phone X").is_ok());
/// assert!(require_field("name", "   ").is_err());
/// ```
pub fn require_field(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CatalogError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

/// Check the preconditions of adding an item
pub fn validate_new_item(name: &str, category: &str, image: &[u8]) -> Result<()> {
    require_field("name", name)?;
    require_field("category", category)?;
    if image.is_empty() {
        return Err(CatalogError::Validation(
            "uploaded image file is empty".to_string(),
        ));
    }
    Ok(())
}

/// Whether a path ends in a recognized image suffix (case-sensitive)
pub fn has_image_suffix(path: &Path) -> bool {
    path.to_str()
        .map(|s| IMAGE_SUFFIXES.iter().any(|suffix| s.ends_with(suffix)))
        .unwrap_or(false)
}

/// Lexically clean a path
///
/// Drops `.` segments and resolves `..` against the preceding normal
/// segment. Leading `..` segments of a relative path are kept; `..` directly
/// under the root of an absolute path is dropped. Returns `.` for an empty
/// result.
///
/// # Examples
///
/// ```
/// use catalog_store::validation::clean_path;
/// use std::path::Path;
///
/// assert_eq!(clean_path(Path::new("images/./a/../b.jpg")), Path::new("images/b.jpg"));
/// assert_eq!(clean_path(Path::new("../x/../../y")), Path::new("../../y"));
/// assert_eq!(clean_path(Path::new("/../etc")), Path::new("/etc"));
/// assert_eq!(clean_path(Path::new("a/..")), Path::new("."));
/// ```
pub fn clean_path(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }

    if out.is_empty() {
        PathBuf::from(".")
    } else {
        out.iter().collect()
    }
}

/// Whether `candidate` lies strictly beneath `root` after cleaning both
///
/// The root itself does not count as contained.
pub fn is_within(root: &Path, candidate: &Path) -> bool {
    let root = clean_path(root);
    let candidate = clean_path(candidate);

    if candidate == root {
        return false;
    }

    if root == Path::new(".") {
        return candidate.is_relative()
            && !matches!(candidate.components().next(), Some(Component::ParentDir));
    }

    candidate.starts_with(&root)
}

/// Join an untrusted image name onto `root` and validate the result
///
/// Fails with `InvalidPath` when the name is empty, escapes the root, or
/// lacks a `.jpg`/`.jpeg` suffix. The returned path is cleaned.
pub fn resolve_image_name(root: &Path, file_name: &str) -> Result<PathBuf> {
    if file_name.is_empty() {
        return Err(CatalogError::InvalidPath(
            "image file name is required".to_string(),
        ));
    }

    let joined = clean_path(&root.join(file_name));

    if !is_within(root, &joined) {
        return Err(CatalogError::InvalidPath(format!(
            "{} escapes the image directory",
            file_name
        )));
    }

    if !has_image_suffix(&joined) {
        return Err(CatalogError::InvalidPath(format!(
            "{} does not end with .jpg or .jpeg",
            file_name
        )));
    }

    Ok(joined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_required_fields() {
        assert!(validate_new_item("jacket", "fashion", b"img").is_ok());

        let err = validate_new_item("", "fashion", b"img").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("name is required"));

        let err = validate_new_item("jacket", " ", b"img").unwrap_err();
        assert!(err.to_string().contains("category is required"));

        let err = validate_new_item("jacket", "fashion", b"").unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_clean_path() {
        assert_eq!(clean_path(Path::new("")), Path::new("."));
        assert_eq!(clean_path(Path::new("./a//b/")), Path::new("a/b"));
        assert_eq!(clean_path(Path::new("a/b/../../..")), Path::new(".."));
        assert_eq!(clean_path(Path::new("/a/../../b")), Path::new("/b"));
        assert_eq!(clean_path(Path::new("../../a")), Path::new("../../a"));
    }

    #[test]
    fn test_is_within() {
        assert!(is_within(Path::new("images"), Path::new("images/a.jpg")));
        assert!(is_within(Path::new("./images/"), Path::new("images/sub/a.jpg")));
        assert!(!is_within(Path::new("images"), Path::new("images")));
        assert!(!is_within(Path::new("images"), Path::new("other/a.jpg")));
        assert!(!is_within(Path::new("images"), Path::new("images-old/a.jpg")));
        assert!(!is_within(Path::new("../images"), Path::new("../../images/a.jpg")));

        assert!(is_within(Path::new("."), Path::new("a.jpg")));
        assert!(!is_within(Path::new("."), Path::new("../a.jpg")));
        assert!(!is_within(Path::new("."), Path::new("/a.jpg")));
    }

    #[test]
    fn test_resolve_accepts_plain_names() {
        let root = Path::new("/srv/images");

        assert_eq!(
            resolve_image_name(root, "abc.jpg").unwrap(),
            Path::new("/srv/images/abc.jpg")
        );
        assert_eq!(
            resolve_image_name(root, "nested/../abc.jpeg").unwrap(),
            Path::new("/srv/images/abc.jpeg")
        );
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let root = Path::new("/srv/images");

        for name in [
            "../secret.jpg",
            "../../etc/passwd",
            "a/../../b.jpg",
            "/etc/hosts.jpg",
            "..",
            ".",
        ] {
            let err = resolve_image_name(root, name).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidPath, "name {:?}", name);
        }
    }

    #[test]
    fn test_resolve_rejects_bad_suffix() {
        let root = Path::new("images");

        for name in ["a.png", "a.jpg.txt", "a", "a.JPG", ""] {
            let err = resolve_image_name(root, name).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidPath, "name {:?}", name);
        }
    }
}
