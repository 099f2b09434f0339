//! Directory walker implementation using walkdir.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for recursively enumerating the
//! regular files under a root directory, applying the size and extension
//! filters of a [`SearchConfig`].
//!
//! # Error policy
//!
//! - Problems below the root (permission denied on a directory, an entry
//!   vanishing mid-walk, unreadable metadata) are logged and the entry is
//!   skipped. The walk continues.
//! - A root that cannot be read, or is not a directory, fails the whole call
//!   with a [`ScanError`]. No partial results are returned in that case.
//!
//! Symbolic links are never followed into directories. A link is reported
//! only when it resolves to a regular file.
//!
//! # Example
//!
//! ```no_run
//! use seekfs::scanner::{SearchConfig, Walker};
//!
//! let config = SearchConfig::new("/home/user/Documents");
//! let files = Walker::new(&config).walk().unwrap();
//! println!("Found {} files", files.len());
//! ```

use std::fs::Metadata;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use walkdir::{DirEntry, WalkDir};

use super::{normalized_extension, FileEntry, ScanError, SearchConfig};
use crate::progress::{ProgressCallback, PHASE_SCANNING};

/// Recursive file enumerator.
pub struct Walker<'a> {
    /// Filters and root for this walk
    config: &'a SearchConfig,
    /// Optional progress callback, ticked once per accepted file
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for Walker<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Walker")
            .field("config", &self.config)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl<'a> Walker<'a> {
    /// Create a new walker for the given configuration.
    #[must_use]
    pub fn new(config: &'a SearchConfig) -> Self {
        Self {
            config,
            progress_callback: None,
        }
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Walk the directory tree and collect every file that passes the
    /// filters, in traversal order (entries sorted by file name per directory).
    ///
    /// # Errors
    ///
    /// - [`ScanError::NotFound`] if the root does not exist
    /// - [`ScanError::NotADirectory`] if the root is not a directory
    /// - [`ScanError::RootUnreadable`] if the root directory cannot be read
    pub fn walk(&self) -> Result<Vec<FileEntry>, ScanError> {
        let root = &self.config.root;
        self.check_root(root)?;

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_start(PHASE_SCANNING, 0);
        }

        let mut files = Vec::new();
        let mut skipped = 0usize;

        for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    let source = e
                        .into_io_error()
                        .unwrap_or_else(|| std::io::Error::other("walk failed at root"));
                    log::error!("Cannot read scan root {}: {}", root.display(), source);
                    if let Some(ref callback) = self.progress_callback {
                        callback.on_phase_end(PHASE_SCANNING);
                    }
                    return Err(ScanError::RootUnreadable {
                        path: root.clone(),
                        source,
                    });
                }
                Err(e) => {
                    skipped += 1;
                    let path = e.path().map(Path::display);
                    match e.io_error().map(std::io::Error::kind) {
                        Some(ErrorKind::PermissionDenied) => {
                            log::warn!("Permission denied, skipping: {}", display_opt(path));
                        }
                        _ => log::warn!("Skipping {}: {}", display_opt(path), e),
                    }
                    continue;
                }
            };

            if let Some(file) = self.process_entry(&entry) {
                files.push(file);
                if let Some(ref callback) = self.progress_callback {
                    callback.on_progress(files.len(), &entry.path().to_string_lossy());
                }
            }
        }

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_end(PHASE_SCANNING);
        }

        log::info!(
            "Scan of {} complete: {} files accepted, {} entries skipped on error",
            root.display(),
            files.len(),
            skipped
        );
        Ok(files)
    }

    fn check_root(&self, root: &Path) -> Result<(), ScanError> {
        match std::fs::metadata(root) {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(ScanError::NotADirectory(root.to_path_buf())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(ScanError::NotFound(root.to_path_buf()))
            }
            Err(source) => Err(ScanError::RootUnreadable {
                path: root.to_path_buf(),
                source,
            }),
        }
    }

    /// Turn a walk entry into a FileEntry if it is a regular file that passes
    /// the filters.
    fn process_entry(&self, entry: &DirEntry) -> Option<FileEntry> {
        let file_type = entry.file_type();
        if file_type.is_dir() {
            return None;
        }

        let path = entry.path();
        let metadata = if file_type.is_symlink() {
            // Report the link only if its target is a regular file
            std::fs::metadata(path)
        } else {
            entry.metadata().map_err(std::io::Error::from)
        };
        let metadata: Metadata = match metadata {
            Ok(m) => m,
            Err(e) => {
                log::debug!("Cannot stat {}, skipping: {}", path.display(), e);
                return None;
            }
        };

        if !metadata.is_file() {
            log::trace!("Skipping non-regular entry: {}", path.display());
            return None;
        }

        let size = metadata.len();
        if !self.config.passes_size_filter(size) {
            log::trace!(
                "Skipping file due to size filter ({} > {}): {}",
                size,
                self.config.max_file_size,
                path.display()
            );
            return None;
        }

        let extension = normalized_extension(path);
        if !self.config.passes_extension_filter(extension.as_deref()) {
            log::trace!("Skipping file due to extension filter: {}", path.display());
            return None;
        }

        Some(FileEntry {
            path: path.to_path_buf(),
            size,
            extension,
        })
    }
}

fn display_opt(path: Option<std::path::Display<'_>>) -> String {
    path.map_or_else(|| "<unknown>".to_string(), |p| p.to_string())
}
