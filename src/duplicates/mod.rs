//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Candidate grouping by size and file name (Phase 1)
//! - Full content digest comparison (Phase 2)

pub mod finder;
pub mod groups;

pub use finder::{DuplicateFinder, FinderPhase, FinderStats};
pub use groups::{
    group_by_candidate_key, CandidateBuckets, CandidateKey, DuplicateMap, GroupingStats,
};
