//! Pipeline facade.
//!
//! [`FileSearcher`] owns a [`SearchConfig`] and a thread count and runs one
//! query per call: every call re-scans the tree from scratch.
//!
//! # Example
//!
//! ```no_run
//! use seekfs::searcher::FileSearcher;
//!
//! let mut searcher = FileSearcher::new("/data", 4)?;
//! searcher.set_case_sensitive(false);
//! searcher.set_allowed_extensions(["rs", "toml"]);
//!
//! for path in searcher.search_by_content("fn main")? {
//!     println!("{path}");
//! }
//! # Ok::<(), seekfs::searcher::SearchError>(())
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use crate::duplicates::{DuplicateFinder, DuplicateMap, FinderStats};
use crate::progress::ProgressCallback;
use crate::scanner::{FileEntry, Hasher, ScanError, SearchConfig, Walker};
use crate::search::{BatchEvaluator, ContentMatcher, FilePredicate, NameMatcher};

/// Errors returned by [`FileSearcher`].
#[derive(thiserror::Error, Debug)]
pub enum SearchError {
    /// The root passed to [`FileSearcher::new`] does not exist.
    #[error("Path does not exist: {0}")]
    PathNotFound(PathBuf),

    /// A setting was given an unusable value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A name or content pattern failed to compile.
    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The pattern as given
        pattern: String,
        /// The compile error
        #[source]
        source: regex::Error,
    },

    /// The scan root could not be enumerated.
    #[error(transparent)]
    Scan(#[from] ScanError),
}

/// Search and duplicate detection over one directory tree.
pub struct FileSearcher {
    config: SearchConfig,
    evaluator: BatchEvaluator,
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FileSearcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSearcher")
            .field("config", &self.config)
            .field("evaluator", &self.evaluator)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl FileSearcher {
    /// Create a searcher rooted at `root`.
    ///
    /// A `thread_count` below 1 is raised to 1.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::PathNotFound`] if `root` does not exist.
    pub fn new(root: impl Into<PathBuf>, thread_count: i64) -> Result<Self, SearchError> {
        let root = root.into();
        if !root.exists() {
            return Err(SearchError::PathNotFound(root));
        }

        let evaluator = BatchEvaluator::new(thread_count);
        log::debug!(
            "Searcher created for {} with {} threads",
            root.display(),
            evaluator.threads()
        );

        Ok(Self {
            config: SearchConfig::new(root),
            evaluator,
            progress_callback: None,
        })
    }

    /// Set the progress callback used by every subsequent query.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.evaluator = self.evaluator.with_progress_callback(Arc::clone(&callback));
        self.progress_callback = Some(callback);
        self
    }

    /// Toggle case-sensitive pattern matching (default: sensitive).
    pub fn set_case_sensitive(&mut self, case_sensitive: bool) {
        self.config.case_sensitive = case_sensitive;
    }

    /// Set the largest file size, in bytes, that is considered at all.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidConfig`] for a limit of zero.
    pub fn set_max_file_size(&mut self, bytes: u64) -> Result<(), SearchError> {
        if bytes == 0 {
            return Err(SearchError::InvalidConfig(
                "maximum file size must be greater than zero".to_string(),
            ));
        }
        self.config.max_file_size = bytes;
        Ok(())
    }

    /// Restrict every query to the given extensions. An empty set removes the
    /// restriction.
    pub fn set_allowed_extensions<I, S>(&mut self, extensions: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.config.set_allowed_extensions(extensions);
    }

    /// Current filter configuration.
    #[must_use]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Effective worker count.
    #[must_use]
    pub fn thread_count(&self) -> usize {
        self.evaluator.threads()
    }

    /// Paths of files whose base name contains a match for `pattern`.
    ///
    /// # Errors
    ///
    /// Fails on a malformed pattern (before scanning) or an unreadable root.
    pub fn search_by_name(&self, pattern: &str) -> Result<Vec<String>, SearchError> {
        let matcher = NameMatcher::new(pattern, self.config.case_sensitive).map_err(|source| {
            SearchError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            }
        })?;
        let results = self.run(&matcher)?;
        log::info!("Name search '{}': {} matches", pattern, results.len());
        Ok(results)
    }

    /// Paths of files with at least one line matching `pattern`.
    ///
    /// Files that cannot be read are treated as non-matching.
    ///
    /// # Errors
    ///
    /// Fails on a malformed pattern (before scanning) or an unreadable root.
    pub fn search_by_content(&self, pattern: &str) -> Result<Vec<String>, SearchError> {
        let matcher =
            ContentMatcher::new(pattern, self.config.case_sensitive).map_err(|source| {
                SearchError::InvalidPattern {
                    pattern: pattern.to_string(),
                    source,
                }
            })?;
        let results = self.run(&matcher)?;
        log::info!("Content search '{}': {} matches", pattern, results.len());
        Ok(results)
    }

    /// Groups of files with identical content (and identical base names).
    ///
    /// # Errors
    ///
    /// Fails only when the root cannot be enumerated.
    pub fn find_duplicates(&self) -> Result<DuplicateMap, SearchError> {
        self.find_duplicates_with_stats().map(|(groups, _)| groups)
    }

    /// Like [`find_duplicates`](Self::find_duplicates), also returning
    /// statistics.
    ///
    /// # Errors
    ///
    /// Fails only when the root cannot be enumerated.
    pub fn find_duplicates_with_stats(&self) -> Result<(DuplicateMap, FinderStats), SearchError> {
        let files = self.scan()?;
        let mut finder = DuplicateFinder::new(Hasher::new());
        if let Some(ref callback) = self.progress_callback {
            finder = finder.with_progress_callback(Arc::clone(callback));
        }
        Ok(finder.find_duplicates_from_files(files))
    }

    fn scan(&self) -> Result<Vec<FileEntry>, SearchError> {
        let mut walker = Walker::new(&self.config);
        if let Some(ref callback) = self.progress_callback {
            walker = walker.with_progress_callback(Arc::clone(callback));
        }
        Ok(walker.walk()?)
    }

    fn run<P: FilePredicate>(&self, predicate: &P) -> Result<Vec<String>, SearchError> {
        let files = self.scan()?;
        Ok(self.evaluator.evaluate(&files, predicate))
    }
}
