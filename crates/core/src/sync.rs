//! Sync decision and run orchestration
//!
//! A run moves through Scanning, Deciding, Uploading. Re-running with
//! overwrite off converges on the same remote state, which stands in for
//! transactional semantics: an interrupted run is repaired by the next one.

use crate::config::{FailurePolicy, UploadOptions};
use crate::error::{Error, Result};
use crate::scan::{scan_tree, LocalFile};
use crate::store::{ObjectStore, RemoteObject};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Per-file outcome of the skip heuristic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncDecision {
    /// Remote object matches on path and size; treat as already uploaded
    Skip,
    /// Missing remotely, size differs, or overwrite is forced
    Upload,
}

/// Decide whether `local` needs uploading given the remote state.
///
/// Size equality is the only change signal. A same-size file with different
/// content is skipped; the original behaves this way and callers depend on
/// the cheap head-only comparison, so this stays a size check rather than a
/// content hash.
pub fn decide(overwrite: bool, local: &LocalFile, remote: Option<&RemoteObject>) -> SyncDecision {
    if overwrite {
        return SyncDecision::Upload;
    }
    match remote {
        None => SyncDecision::Upload,
        Some(meta) if meta.size == local.size => SyncDecision::Skip,
        Some(_) => SyncDecision::Upload,
    }
}

/// Outcome of one sync run
#[derive(Debug, Default)]
pub struct SyncReport {
    pub uploaded: usize,
    pub skipped: usize,
    /// (key, error message) for transfers that failed under `on_error = "continue"`
    pub failed: Vec<(String, String)>,
}

/// Progress callback: (completed uploads, total uploads, key just finished).
/// Called once with `(0, total, "")` when the work list is known, then after
/// each completed upload.
pub type ProgressFn = Box<dyn Fn(usize, usize, &str) + Send + Sync>;

/// Drives one upload run against an [`ObjectStore`]
pub struct SyncRunner<'a> {
    store: &'a dyn ObjectStore,
    root: PathBuf,
    options: UploadOptions,
    progress: Option<ProgressFn>,
}

impl<'a> SyncRunner<'a> {
    pub fn new(store: &'a dyn ObjectStore, root: &Path, options: UploadOptions) -> Self {
        Self {
            store,
            root: root.to_path_buf(),
            options,
            progress: None,
        }
    }

    /// Register a callback invoked after each completed upload
    pub fn with_progress(mut self, progress: ProgressFn) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Execute the run: scan, decide, upload.
    ///
    /// Fails fast if the bucket is unreachable or credentials are bad.
    /// A single file's transfer failure aborts the run unless the options
    /// say to continue, in which case it lands in `report.failed`.
    pub async fn run(&self) -> Result<SyncReport> {
        self.store.verify_access().await?;

        let files = scan_tree(&self.root)?;
        info!(count = files.len(), "Scanned local tree");

        let mut report = SyncReport::default();
        let work = self.build_work_list(&files, &mut report).await?;

        let total = work.len();
        info!(
            uploads = total,
            skipped = report.skipped,
            "Upload work list built"
        );
        if let Some(progress) = &self.progress {
            progress(0, total, "");
        }

        for (done, file) in work.iter().enumerate() {
            match self.upload_one(file).await {
                Ok(()) => {
                    report.uploaded += 1;
                    if let Some(progress) = &self.progress {
                        progress(done + 1, total, &file.rel_path);
                    }
                }
                Err(e) => match self.options.on_error {
                    FailurePolicy::Abort => return Err(e),
                    FailurePolicy::Continue => {
                        warn!(key = %file.rel_path, error = %e, "Upload failed, continuing");
                        report.failed.push((file.rel_path.clone(), e.to_string()));
                    }
                },
            }
        }

        Ok(report)
    }

    /// Deciding phase. With overwrite on, remote lookups are skipped
    /// entirely since their result would never be consulted.
    async fn build_work_list(
        &self,
        files: &[LocalFile],
        report: &mut SyncReport,
    ) -> Result<Vec<LocalFile>> {
        if self.options.overwrite {
            return Ok(files.to_vec());
        }

        let mut work = Vec::new();
        for file in files {
            let remote = self.store.head(&file.rel_path).await?;
            match decide(false, file, remote.as_ref()) {
                SyncDecision::Skip => {
                    debug!(key = %file.rel_path, "Skipping file");
                    report.skipped += 1;
                }
                SyncDecision::Upload => work.push(file.clone()),
            }
        }
        Ok(work)
    }

    async fn upload_one(&self, file: &LocalFile) -> Result<()> {
        debug!(key = %file.rel_path, size = file.size, "Uploading file");

        let mut path = self.root.clone();
        for part in file.rel_path.split('/') {
            path.push(part);
        }

        let body = tokio::fs::read(&path).await.map_err(Error::Io)?;
        let content_type = mime_guess::from_path(&path)
            .first_or_octet_stream()
            .to_string();

        self.store
            .put(&file.rel_path, body, &content_type, self.options.policy)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local(rel_path: &str, size: u64) -> LocalFile {
        LocalFile {
            rel_path: rel_path.to_string(),
            size,
        }
    }

    fn remote(key: &str, size: u64) -> RemoteObject {
        RemoteObject {
            key: key.to_string(),
            size,
        }
    }

    #[test]
    fn test_decide_overwrite_always_uploads() {
        let f = local("a.jpg", 100);
        assert_eq!(decide(true, &f, None), SyncDecision::Upload);
        assert_eq!(
            decide(true, &f, Some(&remote("a.jpg", 100))),
            SyncDecision::Upload
        );
        assert_eq!(
            decide(true, &f, Some(&remote("a.jpg", 999))),
            SyncDecision::Upload
        );
    }

    #[test]
    fn test_decide_absent_remote_uploads() {
        assert_eq!(decide(false, &local("a.jpg", 100), None), SyncDecision::Upload);
    }

    #[test]
    fn test_decide_size_match_skips() {
        let f = local("a.jpg", 100);
        assert_eq!(
            decide(false, &f, Some(&remote("a.jpg", 100))),
            SyncDecision::Skip
        );
    }

    #[test]
    fn test_decide_size_mismatch_uploads() {
        let f = local("a.jpg", 100);
        assert_eq!(
            decide(false, &f, Some(&remote("a.jpg", 999))),
            SyncDecision::Upload
        );
    }

    #[test]
    fn test_decide_zero_byte_file() {
        let f = local("empty.txt", 0);
        assert_eq!(
            decide(false, &f, Some(&remote("empty.txt", 0))),
            SyncDecision::Skip
        );
    }
}
