//! Result rendering for the command-line front end.
//!
//! A run collects the outcome of every requested query into a
//! [`SearchReport`], which is then rendered by one of:
//! - [`TextOutput`]: human-readable listing
//! - [`JsonOutput`]: one JSON document for scripting
//!
//! # Example
//!
//! ```no_run
//! use seekfs::output::{SearchReport, TextOutput};
//! use seekfs::searcher::FileSearcher;
//!
//! let searcher = FileSearcher::new(".", 4).unwrap();
//! let mut report = SearchReport::default();
//! report.record_name("main", searcher.search_by_name("main"));
//!
//! TextOutput::new(&report).write_to(&mut std::io::stdout()).unwrap();
//! ```

pub mod json;
pub mod text;

use serde::Serialize;

use crate::duplicates::DuplicateMap;
use crate::error::ExitCode;
use crate::searcher::SearchError;

pub use json::JsonOutput;
pub use text::TextOutput;

/// The three queries a run can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Query {
    /// Search by file name
    Name,
    /// Search by file content
    Content,
    /// Duplicate detection
    Duplicates,
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Query::Name => write!(f, "name"),
            Query::Content => write!(f, "content"),
            Query::Duplicates => write!(f, "duplicates"),
        }
    }
}

/// Files matched by a name or content query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchReport {
    /// Pattern as given on the command line
    pub pattern: String,
    /// Matching paths in result order
    pub files: Vec<String>,
}

/// A query that returned an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryFailure {
    /// Which query failed
    pub query: Query,
    /// Error message
    pub message: String,
}

/// Everything one run produced.
///
/// A query that was not requested, or that failed, leaves its slot `None`;
/// failures are listed in `errors`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchReport {
    /// Name query result
    pub name: Option<MatchReport>,
    /// Content query result
    pub content: Option<MatchReport>,
    /// Duplicate query result
    pub duplicates: Option<DuplicateMap>,
    /// Failed queries in execution order
    pub errors: Vec<QueryFailure>,
}

impl SearchReport {
    /// Record the outcome of a name query.
    pub fn record_name(&mut self, pattern: &str, result: Result<Vec<String>, SearchError>) {
        self.name = self.record_matches(Query::Name, pattern, result);
    }

    /// Record the outcome of a content query.
    pub fn record_content(&mut self, pattern: &str, result: Result<Vec<String>, SearchError>) {
        self.content = self.record_matches(Query::Content, pattern, result);
    }

    /// Record the outcome of a duplicate query.
    pub fn record_duplicates(&mut self, result: Result<DuplicateMap, SearchError>) {
        match result {
            Ok(groups) => self.duplicates = Some(groups),
            Err(e) => self.record_failure(Query::Duplicates, &e),
        }
    }

    fn record_matches(
        &mut self,
        query: Query,
        pattern: &str,
        result: Result<Vec<String>, SearchError>,
    ) -> Option<MatchReport> {
        match result {
            Ok(files) => Some(MatchReport {
                pattern: pattern.to_string(),
                files,
            }),
            Err(e) => {
                self.record_failure(query, &e);
                None
            }
        }
    }

    fn record_failure(&mut self, query: Query, err: &SearchError) {
        log::debug!("Query {} failed: {:?}", query, err);
        self.errors.push(QueryFailure {
            query,
            message: err.to_string(),
        });
    }

    /// Exit code for this report: [`ExitCode::SearchFailed`] if any query
    /// failed.
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        if self.errors.is_empty() {
            ExitCode::Success
        } else {
            ExitCode::SearchFailed
        }
    }
}

/// Duplicate groups ordered by digest, so output is stable across runs.
#[must_use]
pub fn sorted_groups(groups: &DuplicateMap) -> Vec<(&String, &Vec<String>)> {
    let mut sorted: Vec<_> = groups.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    sorted
}
