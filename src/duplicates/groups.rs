//! Candidate-key grouping (phase 1 of duplicate detection).
//!
//! # Overview
//!
//! Before paying for a full content digest, files are bucketed by a cheap
//! [`CandidateKey`]: the file size together with a digest of the file's base
//! name. Only buckets with two or more members go on to full hashing.
//!
//! Because the name is part of the key, two files with identical bytes but
//! different names land in different buckets and are never reported as
//! duplicates.
//!
//! Buckets come back in first-seen order: the bucket whose first member
//! appears earliest in the input comes first.
//!
//! # Example
//!
//! ```
//! use seekfs::scanner::FileEntry;
//! use seekfs::duplicates::group_by_candidate_key;
//! use std::path::PathBuf;
//!
//! let files = vec![
//!     FileEntry::new(PathBuf::from("/a/photo.jpg"), 1024),
//!     FileEntry::new(PathBuf::from("/b/photo.jpg"), 1024),
//!     FileEntry::new(PathBuf::from("/c/copy.jpg"), 1024),
//! ];
//!
//! let (groups, stats) = group_by_candidate_key(files);
//!
//! assert_eq!(groups.len(), 1);
//! assert_eq!(stats.total_files, 3);
//! assert_eq!(stats.potential_duplicates, 2);
//! ```

use std::collections::HashMap;

use crate::digest::{Digest, Md5};
use crate::scanner::FileEntry;

/// Mapping from content digest (32 hex chars) to the paths sharing it.
///
/// Only digests with two or more paths appear.
pub type DuplicateMap = HashMap<String, Vec<String>>;

/// Candidate buckets in first-seen order, each holding 2+ files.
pub type CandidateBuckets = Vec<(CandidateKey, Vec<FileEntry>)>;

/// Cheap pre-filter key: equal keys do not imply equal content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CandidateKey {
    /// File size in bytes
    pub size: u64,
    /// Digest of the file's base name
    pub name_digest: Digest,
}

impl CandidateKey {
    /// Derive the key for a scanned file.
    #[must_use]
    pub fn for_entry(file: &FileEntry) -> Self {
        Self::new(file.size, &file.file_name())
    }

    /// Build a key from a size and a base name.
    #[must_use]
    pub fn new(size: u64, file_name: &str) -> Self {
        Self {
            size,
            name_digest: Md5::digest(file_name.as_bytes()),
        }
    }
}

/// Statistics from the candidate grouping phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total number of files processed
    pub total_files: usize,
    /// Number of distinct candidate keys
    pub unique_keys: usize,
    /// Files in buckets of 2+ (these will be fully hashed)
    pub potential_duplicates: usize,
    /// Files discarded because their key was unique
    pub eliminated_unique: usize,
    /// Number of buckets with 2+ files
    pub candidate_groups: usize,
}

impl GroupingStats {
    /// Percentage of files eliminated without hashing their content.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.eliminated_unique as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Group files by [`CandidateKey`], dropping singleton buckets.
///
/// Files keep their relative input order inside each bucket, and buckets are
/// ordered by the position of their first member in the input.
///
/// # Returns
///
/// A tuple of:
/// - `CandidateBuckets` - buckets with 2+ files, in first-seen order
/// - `GroupingStats` - statistics about the grouping
#[must_use]
pub fn group_by_candidate_key(
    files: impl IntoIterator<Item = FileEntry>,
) -> (CandidateBuckets, GroupingStats) {
    let mut index: HashMap<CandidateKey, usize> = HashMap::new();
    let mut all_groups: CandidateBuckets = Vec::new();
    let mut stats = GroupingStats::default();

    for file in files {
        stats.total_files += 1;
        let key = CandidateKey::for_entry(&file);
        let slot = *index.entry(key).or_insert_with(|| {
            all_groups.push((key, Vec::new()));
            all_groups.len() - 1
        });
        all_groups[slot].1.push(file);
    }

    stats.unique_keys = all_groups.len();

    let filtered: CandidateBuckets = all_groups
        .into_iter()
        .filter(|(key, files)| {
            if files.len() == 1 {
                stats.eliminated_unique += 1;
                log::trace!(
                    "Eliminated unique candidate ({} bytes): {}",
                    key.size,
                    files[0].path.display()
                );
                false
            } else {
                stats.potential_duplicates += files.len();
                stats.candidate_groups += 1;
                true
            }
        })
        .collect();

    log::info!(
        "Candidate grouping complete: {} files → {} potential duplicates ({:.1}% eliminated)",
        stats.total_files,
        stats.potential_duplicates,
        stats.elimination_rate()
    );

    (filtered, stats)
}
