//! Directory scanner module.
//!
//! Walks the source directory recursively and produces candidates in a
//! stable order (file names sorted within each directory), so repeated runs
//! over the same tree resolve collisions the same way.

use crate::models::candidate::Candidate;
use crate::models::persistent::PERSISTENT_CONFIG_FILE;
use crate::utils::fs::get_extension;
use crate::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Supported image file extensions.
const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "tif", "tiff", "webp", "heic", "heif", // Raw formats
    "cr2", "cr3", "nef", "arw", "orf", "rw2", "dng", "raf",
];

/// Supported video file extensions.
const VIDEO_EXTENSIONS: &[&str] = &[
    "mkv", "mp4", "avi", "mov", "wmv", "m4v", "mts", "m2ts", "3gp", "mpg", "mpeg", "webm",
];

/// Scanner options.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Accept every regular file instead of media files only.
    pub all_files: bool,
    /// Extensions accepted in addition to the built-in lists.
    pub extra_extensions: Vec<String>,
    /// Directory to leave out, usually a destination nested in the source.
    pub exclude: Option<PathBuf>,
}

/// Result of scanning a directory.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Accepted files in processing order.
    pub candidates: Vec<Candidate>,
    /// Files ignored because of their type.
    pub ignored: usize,
    /// Files or directories that could not be read.
    pub unreadable: usize,
    /// Total files scanned.
    pub total_files_scanned: usize,
}

/// Check if a file is a photo or video based on its extension.
pub fn is_media_file(path: &Path) -> bool {
    get_extension(path)
        .map(|ext| {
            IMAGE_EXTENSIONS.contains(&ext.as_str()) || VIDEO_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

fn is_accepted(path: &Path, options: &ScanOptions) -> bool {
    if options.all_files || is_media_file(path) {
        return true;
    }
    get_extension(path)
        .map(|ext| {
            options
                .extra_extensions
                .iter()
                .any(|extra| extra.trim_start_matches('.').eq_ignore_ascii_case(&ext))
        })
        .unwrap_or(false)
}

/// Scan a directory for candidates.
///
/// # Arguments
/// * `path` - The directory path to scan
/// * `options` - Filtering options
pub fn scan_directory(path: &Path, options: &ScanOptions) -> Result<ScanResult> {
    crate::utils::fs::ensure_directory(path)?;

    let mut result = ScanResult::default();

    let walker = WalkDir::new(path)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| match &options.exclude {
            Some(excluded) => !entry.path().starts_with(excluded),
            None => true,
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Could not read directory entry: {}", e);
                result.unreadable += 1;
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }
        result.total_files_scanned += 1;

        let entry_path = entry.path();
        if entry.file_name() == PERSISTENT_CONFIG_FILE || !is_accepted(entry_path, options) {
            tracing::debug!("Ignoring: {}", entry_path.display());
            result.ignored += 1;
            continue;
        }

        match Candidate::from_path(entry_path) {
            Ok(candidate) => result.candidates.push(candidate),
            Err(e) => {
                tracing::warn!("Failed to read file {:?}: {}", entry_path, e);
                result.unreadable += 1;
            }
        }
    }

    tracing::info!(
        "Scanned {} files: {} candidates, {} ignored, {} unreadable",
        result.total_files_scanned,
        result.candidates.len(),
        result.ignored,
        result.unreadable
    );

    Ok(result)
}
