//! Scanner module for directory traversal and file hashing.
//!
//! This module provides functionality for:
//! - Recursive directory walking using walkdir
//! - Size and extension filtering
//! - Streaming content digests of whole files
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`hasher`]: Streams file contents through the [`crate::digest`] engine
//!
//! # Example
//!
//! ```no_run
//! use seekfs::scanner::{SearchConfig, Walker};
//!
//! let mut config = SearchConfig::new(".");
//! config.max_file_size = 1024 * 1024;
//! config.set_allowed_extensions(["rs", "toml"]);
//!
//! let files = Walker::new(&config).walk().unwrap();
//! for file in &files {
//!     println!("{}: {} bytes", file.path.display(), file.size);
//! }
//! ```

pub mod hasher;
pub mod walker;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub use hasher::{Hasher, DEFAULT_BUFFER_SIZE};
pub use walker::Walker;

/// Default upper bound on the size of a scanned file (100 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// A regular file discovered by the [`Walker`].
///
/// Size and extension are captured once during the walk and never refreshed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Path to the file, rooted at the scan root
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Lowercased extension without the leading dot
    pub extension: Option<String>,
}

impl FileEntry {
    /// Create a new FileEntry, deriving the extension from the path.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the file
    /// * `size` - File size in bytes
    #[must_use]
    pub fn new(path: PathBuf, size: u64) -> Self {
        let extension = normalized_extension(&path);
        Self {
            path,
            size,
            extension,
        }
    }

    /// Base name of the file, lossily converted to UTF-8.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Path as a display string, the form returned by every query.
    #[must_use]
    pub fn path_string(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

/// Lowercased extension of `path`, if it has a non-empty one.
#[must_use]
pub fn normalized_extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .filter(|ext| !ext.is_empty())
}

/// Filter configuration for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Directory the walk starts from
    pub root: PathBuf,
    /// Whether name and content patterns are matched case-sensitively
    pub case_sensitive: bool,
    /// Files larger than this (in bytes) are skipped
    pub max_file_size: u64,
    /// Extensions to keep, lowercased without dot. Empty means all files.
    pub allowed_extensions: HashSet<String>,
}

impl SearchConfig {
    /// Create a configuration with default filters for `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            case_sensitive: true,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            allowed_extensions: HashSet::new(),
        }
    }

    /// Replace the extension filter.
    ///
    /// Entries are trimmed, stripped of a leading `.`, and lowercased. Blank
    /// entries are dropped, so `[""]` means "no filter".
    pub fn set_allowed_extensions<I, S>(&mut self, extensions: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed_extensions = extensions
            .into_iter()
            .map(|ext| {
                let ext = ext.as_ref().trim();
                ext.strip_prefix('.').unwrap_or(ext).to_lowercase()
            })
            .filter(|ext| !ext.is_empty())
            .collect();
    }

    /// Check the size filter.
    #[must_use]
    pub fn passes_size_filter(&self, size: u64) -> bool {
        size <= self.max_file_size
    }

    /// Check the extension filter. A file without an extension only passes
    /// when no filter is set.
    #[must_use]
    pub fn passes_extension_filter(&self, extension: Option<&str>) -> bool {
        if self.allowed_extensions.is_empty() {
            return true;
        }
        extension.is_some_and(|ext| self.allowed_extensions.contains(ext))
    }
}

/// Errors that abort a directory scan.
///
/// Per-entry problems below the root never produce these; they are logged and
/// the entry is skipped.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// The scan root does not exist.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The scan root is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The scan root could not be read.
    #[error("Cannot read scan root {path}: {source}")]
    RootUnreadable {
        /// The root path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur while digesting a file.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The file could not be opened.
    #[error("Cannot open {path}: {source}")]
    Unreadable {
        /// Path of the file
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A read failed after the file was opened.
    #[error("Read error in {path}: {source}")]
    Read {
        /// Path of the file
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The digest engine rejected input.
    #[error("Digest fault for {path}: {source}")]
    Digest {
        /// Path of the file
        path: PathBuf,
        /// The state-machine violation
        #[source]
        source: crate::digest::DigestError,
    },
}

impl HashError {
    /// Path of the file that failed.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Unreadable { path, .. } | Self::Read { path, .. } | Self::Digest { path, .. } => {
                path
            }
        }
    }
}
