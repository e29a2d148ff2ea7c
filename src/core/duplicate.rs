//! Duplicate detection.
//!
//! Two files are duplicates when they have the same size and the same
//! SHA-256 digest.

use crate::utils::hash;
use crate::Result;
use std::path::Path;

/// Check whether two files have identical content.
pub fn is_duplicate(first: &Path, second: &Path) -> Result<bool> {
    let first_len = std::fs::metadata(first)?.len();
    let second_len = std::fs::metadata(second)?.len();
    if first_len != second_len {
        return Ok(false);
    }
    if first == second {
        return Ok(true);
    }

    Ok(hash::sha256_file(first)? == hash::sha256_file(second)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_identical_content() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.jpg");
        let b = dir.path().join("b.jpg");
        fs::write(&a, b"same bytes").unwrap();
        fs::write(&b, b"same bytes").unwrap();
        assert!(is_duplicate(&a, &b).unwrap());
    }

    #[test]
    fn test_different_content_same_size() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.jpg");
        let b = dir.path().join("b.jpg");
        fs::write(&a, b"bytes one").unwrap();
        fs::write(&b, b"bytes two").unwrap();
        assert!(!is_duplicate(&a, &b).unwrap());
    }

    #[test]
    fn test_different_size() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.jpg");
        let b = dir.path().join("b.jpg");
        fs::write(&a, b"short").unwrap();
        fs::write(&b, b"much longer").unwrap();
        assert!(!is_duplicate(&a, &b).unwrap());
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.jpg");
        fs::write(&a, b"x").unwrap();
        assert!(is_duplicate(&a, &dir.path().join("missing")).is_err());
    }
}
