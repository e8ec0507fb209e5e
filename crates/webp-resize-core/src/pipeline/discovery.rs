//! Finds convertible image files for batch runs.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions the sniffer can classify.
pub const CONVERTIBLE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "webp"];

/// Discovers image files in directories.
#[derive(Debug, Clone)]
pub struct FileDiscovery {
    extensions: Vec<String>,
}

/// A file found on disk.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    /// Full path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

impl Default for FileDiscovery {
    fn default() -> Self {
        Self::new(CONVERTIBLE_EXTENSIONS.iter().map(|e| e.to_string()).collect())
    }
}

impl FileDiscovery {
    /// Create a discovery instance matching `extensions` (no leading dot).
    pub fn new(extensions: Vec<String>) -> Self {
        Self { extensions }
    }

    /// Discover all supported files at a path.
    ///
    /// A file path yields itself if supported; a directory is walked
    /// recursively. Results are sorted by path.
    pub fn discover(&self, path: &Path) -> Vec<DiscoveredFile> {
        if path.is_file() {
            return match std::fs::metadata(path) {
                Ok(meta) if self.is_supported(path) => vec![DiscoveredFile {
                    path: path.to_path_buf(),
                    size: meta.len(),
                }],
                _ => vec![],
            };
        }

        let mut files: Vec<DiscoveredFile> = WalkDir::new(path)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && self.is_supported(e.path()))
            .filter_map(|e| {
                let size = e.metadata().ok()?.len();
                Some(DiscoveredFile {
                    path: e.into_path(),
                    size,
                })
            })
            .collect();

        files.sort_by(|a, b| a.path.cmp(&b.path));
        files
    }

    /// Check if a file has a supported extension.
    pub fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }

    /// Total size of all discovered files.
    pub fn total_size(files: &[DiscoveredFile]) -> u64 {
        files.iter().map(|f| f.size).sum()
    }
}
