//! Duplicate finder with two-phase detection.
//!
//! # Overview
//!
//! This module runs the duplicate detection pipeline:
//! 1. **Scanning**: enumerate files with the [`Walker`]
//! 2. **Candidate grouping**: bucket by [`CandidateKey`] (see
//!    [`crate::duplicates::groups`]); unique keys are dropped unhashed
//! 3. **Hash grouping**: digest every file in a bucket of 2+ and keep the
//!    digests shared by at least two paths
//!
//! Buckets are hashed in first-seen scan order. When two buckets (same size,
//! different names) produce a group with the same digest, the earlier bucket
//! keeps the digest and the later group is counted in
//! [`FinderStats::shadowed_groups`] and left out.
//!
//! Hashing runs sequentially on the calling thread. A file that cannot be
//! opened or read is logged, counted in [`FinderStats::failed_files`] and left
//! out; it never fails the run.
//!
//! # Example
//!
//! ```no_run
//! use seekfs::duplicates::DuplicateFinder;
//! use seekfs::scanner::{SearchConfig, Walker};
//!
//! let config = SearchConfig::new(".");
//! let files = Walker::new(&config).walk().unwrap();
//!
//! let (duplicates, stats) = DuplicateFinder::with_defaults().find_duplicates_from_files(files);
//! for (digest, paths) in &duplicates {
//!     println!("{digest}: {paths:?}");
//! }
//! println!("{} groups", stats.duplicate_groups);
//! ```
//!
//! [`Walker`]: crate::scanner::Walker

use std::collections::hash_map::Entry;
use std::sync::Arc;

use super::groups::{group_by_candidate_key, CandidateBuckets, DuplicateMap, GroupingStats};
use crate::progress::{ProgressCallback, PHASE_HASHING};
use crate::scanner::{FileEntry, Hasher, ScanError, SearchConfig, Walker};

/// Stage of the duplicate pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinderPhase {
    /// Enumerating files
    Scanning,
    /// Bucketing by candidate key
    SizeGrouping,
    /// Digesting candidates and grouping by digest
    HashGrouping,
    /// Result available
    Done,
}

impl std::fmt::Display for FinderPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Scanning => "scanning",
            Self::SizeGrouping => "size grouping",
            Self::HashGrouping => "hash grouping",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Statistics from one duplicate search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinderStats {
    /// Candidate grouping statistics
    pub grouping: GroupingStats,
    /// Files whose content was digested successfully
    pub hashed_files: usize,
    /// Files dropped because they could not be opened or read
    pub failed_files: usize,
    /// Number of digest groups with 2+ paths
    pub duplicate_groups: usize,
    /// Total paths across all duplicate groups
    pub duplicate_files: usize,
    /// Digest groups dropped because an earlier bucket claimed the digest
    pub shadowed_groups: usize,
}

/// Two-phase duplicate detector.
pub struct DuplicateFinder {
    hasher: Hasher,
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for DuplicateFinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuplicateFinder")
            .field("hasher", &self.hasher)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl DuplicateFinder {
    /// Create a finder using `hasher` for content digests.
    #[must_use]
    pub fn new(hasher: Hasher) -> Self {
        Self {
            hasher,
            progress_callback: None,
        }
    }

    /// Create a finder with the default hasher.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(Hasher::new())
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Scan `config.root` and find duplicates.
    ///
    /// # Errors
    ///
    /// Fails only when the scan root itself cannot be enumerated.
    pub fn find_duplicates(
        &self,
        config: &SearchConfig,
    ) -> Result<(DuplicateMap, FinderStats), ScanError> {
        log::debug!("Duplicate search phase: {}", FinderPhase::Scanning);
        let mut walker = Walker::new(config);
        if let Some(ref callback) = self.progress_callback {
            walker = walker.with_progress_callback(Arc::clone(callback));
        }
        let files = walker.walk()?;
        Ok(self.find_duplicates_from_files(files))
    }

    /// Find duplicates among already-scanned files.
    ///
    /// Paths inside each group keep the order of `files`.
    #[must_use]
    pub fn find_duplicates_from_files(&self, files: Vec<FileEntry>) -> (DuplicateMap, FinderStats) {
        log::debug!("Duplicate search phase: {}", FinderPhase::SizeGrouping);
        let (candidates, grouping) = group_by_candidate_key(files);

        let mut stats = FinderStats {
            grouping,
            ..Default::default()
        };

        log::debug!("Duplicate search phase: {}", FinderPhase::HashGrouping);
        let duplicates = self.hash_candidates(candidates, &mut stats);

        stats.duplicate_groups = duplicates.len();
        stats.duplicate_files = duplicates.values().map(Vec::len).sum();

        log::debug!("Duplicate search phase: {}", FinderPhase::Done);
        log::info!(
            "Duplicate search complete: {} groups, {} files, {} unreadable",
            stats.duplicate_groups,
            stats.duplicate_files,
            stats.failed_files
        );

        (duplicates, stats)
    }

    fn hash_candidates(
        &self,
        candidates: CandidateBuckets,
        stats: &mut FinderStats,
    ) -> DuplicateMap {
        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_start(PHASE_HASHING, stats.grouping.potential_duplicates);
        }

        let mut duplicates = DuplicateMap::new();
        let mut processed = 0usize;

        for (key, files) in candidates {
            let mut by_digest: Vec<(String, Vec<String>)> = Vec::new();

            for file in &files {
                processed += 1;
                if let Some(ref callback) = self.progress_callback {
                    callback.on_progress(processed, &file.path.to_string_lossy());
                }

                match self.hasher.full_hash(&file.path) {
                    Ok(digest) => {
                        stats.hashed_files += 1;
                        let hex = digest.to_hex();
                        match by_digest.iter_mut().find(|(seen, _)| *seen == hex) {
                            Some((_, paths)) => paths.push(file.path_string()),
                            None => by_digest.push((hex, vec![file.path_string()])),
                        }
                    }
                    Err(e) => {
                        stats.failed_files += 1;
                        log::warn!("Skipping unhashable file: {}", e);
                    }
                }
            }

            for (digest, paths) in by_digest {
                if paths.len() < 2 {
                    continue;
                }
                match duplicates.entry(digest) {
                    Entry::Occupied(existing) => {
                        stats.shadowed_groups += 1;
                        log::debug!(
                            "Digest {} already claimed by an earlier group, dropping {} files: {:?}",
                            existing.key(),
                            paths.len(),
                            paths
                        );
                    }
                    Entry::Vacant(slot) => {
                        log::debug!(
                            "Duplicate group {} ({} bytes): {} files",
                            slot.key(),
                            key.size,
                            paths.len()
                        );
                        slot.insert(paths);
                    }
                }
            }
        }

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_end(PHASE_HASHING);
        }

        duplicates
    }
}
