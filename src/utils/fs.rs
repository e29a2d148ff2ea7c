//! File system utilities.

use crate::utils::hash;
use crate::Result;
use std::fs;
use std::path::Path;
use std::time::SystemTime;

/// Check if a path exists and is a directory.
pub fn ensure_directory(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(crate::Error::PathNotFound(path.display().to_string()));
    }
    if !path.is_dir() {
        return Err(crate::Error::NotADirectory(path.display().to_string()));
    }
    Ok(())
}

/// Create the parent directory of a path if it does not exist yet.
pub fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Modification time of a file, or `None` if nothing exists at `path`.
pub fn modified_time(path: &Path) -> std::io::Result<Option<SystemTime>> {
    match fs::metadata(path) {
        Ok(meta) => meta.modified().map(Some),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Copy a file, keeping its access and modification times.
pub fn copy_file(from: &Path, to: &Path) -> Result<()> {
    ensure_parent(to)?;

    let source_meta = fs::metadata(from)?;
    fs::copy(from, to)?;

    let mut times = fs::FileTimes::new().set_modified(source_meta.modified()?);
    if let Ok(accessed) = source_meta.accessed() {
        times = times.set_accessed(accessed);
    }
    fs::File::options().write(true).open(to)?.set_times(times)?;
    Ok(())
}

/// Move a file from one location to another.
///
/// Tries a rename first and falls back to [`copy_then_remove`] when the
/// destination is on another device.
pub fn move_file(from: &Path, to: &Path, verify_checksum: bool) -> Result<()> {
    ensure_parent(to)?;

    match fs::rename(from, to) {
        Ok(()) => {
            tracing::debug!("Moved (rename): {:?} -> {:?}", from, to);
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::CrossesDevices => {
            tracing::debug!("Cross-filesystem move detected, using copy+delete");
            copy_then_remove(from, to, verify_checksum)
        }
        Err(e) => Err(e.into()),
    }
}

/// Copy a file (optionally checksum-verified), then remove the source.
///
/// A failed removal after a good copy is reported as
/// [`crate::Error::SourceNotRemoved`]; the copy is kept in that case.
pub fn copy_then_remove(from: &Path, to: &Path, verify_checksum: bool) -> Result<()> {
    let checksum = if verify_checksum {
        Some(hash::sha256_file(from)?)
    } else {
        None
    };

    copy_file(from, to)?;

    if let Some(original) = checksum {
        let copied = hash::sha256_file(to)?;
        if original != copied {
            // Remove incomplete copy
            let _ = fs::remove_file(to);
            return Err(crate::Error::ChecksumMismatch(to.to_path_buf()));
        }
    }

    fs::remove_file(from).map_err(|cause| crate::Error::SourceNotRemoved {
        source_path: from.to_path_buf(),
        destination: to.to_path_buf(),
        cause,
    })?;
    tracing::debug!("Moved (copy+delete): {:?} -> {:?}", from, to);
    Ok(())
}

/// Get file extension in lowercase.
pub fn get_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_get_extension() {
        assert_eq!(get_extension(&PathBuf::from("photo.JPG")), Some("jpg".to_string()));
        assert_eq!(get_extension(&PathBuf::from("noext")), None);
    }

    #[test]
    fn test_copy_preserves_mtime() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("a.jpg");
        fs::write(&src, b"image bytes").unwrap();
        let mtime = SystemTime::UNIX_EPOCH + Duration::from_secs(1_682_935_200);
        fs::File::options()
            .write(true)
            .open(&src)
            .unwrap()
            .set_modified(mtime)
            .unwrap();

        let dst = dir.path().join("nested").join("deeper").join("a.jpg");
        copy_file(&src, &dst).unwrap();

        assert_eq!(fs::read(&dst).unwrap(), b"image bytes");
        assert_eq!(fs::metadata(&dst).unwrap().modified().unwrap(), mtime);
        assert!(src.exists());
    }

    #[test]
    fn test_move_file_same_device() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("a.mp4");
        fs::write(&src, b"video").unwrap();
        let dst = dir.path().join("out").join("b.mp4");

        move_file(&src, &dst, true).unwrap();

        assert!(!src.exists());
        assert_eq!(fs::read(&dst).unwrap(), b"video");
    }

    #[test]
    fn test_copy_then_remove() {
        let dir = TempDir::new().unwrap();
        for verify in [true, false] {
            let src = dir.path().join("a.mov");
            fs::write(&src, b"video frames").unwrap();
            let dst = dir.path().join(format!("out_{}", verify)).join("a.mov");

            copy_then_remove(&src, &dst, verify).unwrap();

            assert!(!src.exists());
            assert_eq!(fs::read(&dst).unwrap(), b"video frames");
        }
    }

    #[test]
    fn test_copy_then_remove_missing_source() {
        let dir = TempDir::new().unwrap();
        let dst = dir.path().join("out.jpg");
        let err = copy_then_remove(&dir.path().join("missing.jpg"), &dst, true).unwrap_err();
        assert!(matches!(err, crate::Error::Io(_)));
        assert!(!dst.exists());
    }

    /// procfs files can be read but never unlinked, even by root.
    #[cfg(target_os = "linux")]
    #[test]
    fn test_copy_then_remove_reports_source_not_removed() {
        let src = Path::new("/proc/version");
        if !src.exists() {
            return;
        }
        let dir = TempDir::new().unwrap();
        let dst = dir.path().join("version.txt");

        let err = copy_then_remove(src, &dst, true).unwrap_err();

        assert!(matches!(err, crate::Error::SourceNotRemoved { .. }));
        assert_eq!(
            err.detail_kind(),
            crate::models::entry::DetailKind::SourceNotRemoved
        );
        assert!(dst.exists());
        assert_eq!(fs::read(&dst).unwrap(), fs::read(src).unwrap());
    }

    #[test]
    fn test_modified_time_missing() {
        let dir = TempDir::new().unwrap();
        assert!(modified_time(&dir.path().join("missing")).unwrap().is_none());
    }

    #[test]
    fn test_ensure_directory() {
        let dir = TempDir::new().unwrap();
        assert!(ensure_directory(dir.path()).is_ok());
        let file = dir.path().join("f");
        fs::write(&file, "").unwrap();
        assert!(matches!(
            ensure_directory(&file),
            Err(crate::Error::NotADirectory(_))
        ));
    }
}
