//! Local tree enumeration

use crate::error::{Error, Result};
use std::path::Path;
use walkdir::WalkDir;

/// One regular file under the gallery's output directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    /// Root-relative path, forward-slash separators (doubles as the object key)
    pub rel_path: String,
    /// Size in bytes at scan time
    pub size: u64,
}

/// Enumerate every regular file under `root`, recursively.
///
/// Paths are made root-relative with `/` separators so they can be used
/// directly as object keys, and the result is sorted lexicographically so
/// progress output is stable across runs.
pub fn scan_tree(root: &Path) -> Result<Vec<LocalFile>> {
    if !root.is_dir() {
        return Err(Error::BadRoot(root.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let rel = entry
            .path()
            .strip_prefix(root)
            .map_err(|e| Error::Other(format!("Path outside root: {}", e)))?;
        let mut parts = Vec::new();
        for component in rel.components() {
            let part = component
                .as_os_str()
                .to_str()
                .ok_or_else(|| Error::NonUnicodePath(entry.path().to_path_buf()))?;
            parts.push(part);
        }
        let rel_path = parts.join("/");

        let size = entry.metadata()?.len();
        files.push(LocalFile { rel_path, size });
    }

    files.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
    Ok(files)
}
