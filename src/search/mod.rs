//! Name and content search.
//!
//! This module provides:
//! - [`FilePredicate`]: the per-file test evaluated during a search
//! - [`BatchEvaluator`]: fork-join evaluation of a predicate over a file list
//! - [`NameMatcher`] and [`ContentMatcher`]: the two predicates used by
//!   [`crate::searcher::FileSearcher`]

pub mod evaluator;
pub mod matcher;

use std::path::Path;

pub use evaluator::BatchEvaluator;
pub use matcher::{ContentMatcher, NameMatcher};

/// A side-effect-free test applied to one file.
///
/// Implementations are shared by all batch workers, hence `Sync`. Any closure
/// `Fn(&Path) -> bool + Sync` is a predicate.
pub trait FilePredicate: Sync {
    /// Whether the file at `path` belongs in the result.
    fn matches(&self, path: &Path) -> bool;
}

impl<F> FilePredicate for F
where
    F: Fn(&Path) -> bool + Sync,
{
    fn matches(&self, path: &Path) -> bool {
        self(path)
    }
}
