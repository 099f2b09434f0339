//! JSON output formatter for search results.
//!
//! Provides machine-readable output for scripting and automation.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "name": { "pattern": "file.*", "count": 2, "files": ["./file1.txt", "./file2.txt"] },
//!   "content": null,
//!   "duplicates": {
//!     "count": 1,
//!     "groups": [
//!       { "hash": "5d41402abc4b2a76b9719d911017c592", "files": ["./a/x", "./b/x"] }
//!     ]
//!   },
//!   "errors": [],
//!   "summary": { "exit_code": 0, "exit_code_name": "SF000" }
//! }
//! ```
//!
//! A query that was not requested, or that failed, is `null`. Duplicate
//! groups are sorted by hash.

use std::io::Write;

use serde::Serialize;

use super::{sorted_groups, MatchReport, QueryFailure, SearchReport};
use crate::duplicates::DuplicateMap;

/// Matches of a name or content query.
#[derive(Debug, Clone, Serialize)]
pub struct JsonMatches {
    /// Pattern as given
    pub pattern: String,
    /// Number of matching files
    pub count: usize,
    /// Matching paths
    pub files: Vec<String>,
}

impl JsonMatches {
    /// Convert a [`MatchReport`].
    #[must_use]
    pub fn from_match_report(report: &MatchReport) -> Self {
        Self {
            pattern: report.pattern.clone(),
            count: report.files.len(),
            files: report.files.clone(),
        }
    }
}

/// A single duplicate group.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateGroup {
    /// Content digest (32 hex characters)
    pub hash: String,
    /// Paths sharing that digest
    pub files: Vec<String>,
}

/// All duplicate groups.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicates {
    /// Number of groups
    pub count: usize,
    /// Groups sorted by hash
    pub groups: Vec<JsonDuplicateGroup>,
}

impl JsonDuplicates {
    /// Convert a [`DuplicateMap`].
    #[must_use]
    pub fn from_duplicate_map(groups: &DuplicateMap) -> Self {
        let groups: Vec<JsonDuplicateGroup> = sorted_groups(groups)
            .into_iter()
            .map(|(hash, files)| JsonDuplicateGroup {
                hash: hash.clone(),
                files: files.clone(),
            })
            .collect();
        Self {
            count: groups.len(),
            groups,
        }
    }
}

/// Run summary.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "SF000")
    pub exit_code_name: String,
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Name query result
    pub name: Option<JsonMatches>,
    /// Content query result
    pub content: Option<JsonMatches>,
    /// Duplicate query result
    pub duplicates: Option<JsonDuplicates>,
    /// Failed queries
    pub errors: Vec<QueryFailure>,
    /// Exit status
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Build the JSON document for `report`.
    ///
    /// # Example
    ///
    /// ```
    /// use seekfs::output::{JsonOutput, SearchReport};
    ///
    /// let mut report = SearchReport::default();
    /// report.record_name("main", Ok(vec!["./src/main.rs".to_string()]));
    ///
    /// let output = JsonOutput::new(&report);
    /// assert_eq!(output.name.unwrap().count, 1);
    /// ```
    #[must_use]
    pub fn new(report: &SearchReport) -> Self {
        let exit_code = report.exit_code();
        Self {
            name: report.name.as_ref().map(JsonMatches::from_match_report),
            content: report.content.as_ref().map(JsonMatches::from_match_report),
            duplicates: report
                .duplicates
                .as_ref()
                .map(JsonDuplicates::from_duplicate_map),
            errors: report.errors.clone(),
            summary: JsonSummary {
                exit_code: exit_code.as_i32(),
                exit_code_name: exit_code.code_prefix().to_string(),
            },
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer.
    ///
    /// # Arguments
    ///
    /// * `writer` - The writer to output to (e.g., stdout)
    /// * `pretty` - Whether to pretty-print the output
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::Query;

    fn create_test_report() -> SearchReport {
        let mut groups = DuplicateMap::new();
        groups.insert(
            "ffffffffffffffffffffffffffffffff".to_string(),
            vec!["/b/1".to_string(), "/c/1".to_string()],
        );
        groups.insert(
            "00000000000000000000000000000000".to_string(),
            vec!["/d/2".to_string(), "/e/2".to_string(), "/f/2".to_string()],
        );

        SearchReport {
            name: Some(MatchReport {
                pattern: "file".to_string(),
                files: vec!["/a/file1".to_string(), "/a/file2".to_string()],
            }),
            content: None,
            duplicates: Some(groups),
            errors: vec![QueryFailure {
                query: Query::Content,
                message: "Invalid pattern".to_string(),
            }],
        }
    }

    #[test]
    fn test_json_output_empty() {
        let output = JsonOutput::new(&SearchReport::default());
        assert!(output.name.is_none());
        assert!(output.duplicates.is_none());
        assert!(output.errors.is_empty());
        assert_eq!(output.summary.exit_code, 0);
        assert_eq!(output.summary.exit_code_name, "SF000");
    }

    #[test]
    fn test_json_is_valid() {
        let output = JsonOutput::new(&create_test_report());
        let json = output.to_json().unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["name"]["count"], 2);
        assert_eq!(parsed["name"]["files"][1], "/a/file2");
        assert!(parsed["content"].is_null());
        assert_eq!(parsed["duplicates"]["count"], 2);
        assert_eq!(parsed["errors"][0]["query"], "content");
        assert_eq!(parsed["summary"]["exit_code"], 2);
        assert_eq!(parsed["summary"]["exit_code_name"], "SF002");
    }

    #[test]
    fn test_duplicate_groups_sorted_by_hash() {
        let output = JsonOutput::new(&create_test_report());
        let groups = &output.duplicates.unwrap().groups;
        assert!(groups[0].hash.starts_with('0'));
        assert_eq!(groups[0].files.len(), 3);
        assert!(groups[1].hash.starts_with('f'));
    }

    #[test]
    fn test_to_json_compact() {
        let json = JsonOutput::new(&SearchReport::default()).to_json().unwrap();
        assert!(!json.contains('\n'));
        assert!(json.starts_with('{'));
    }

    #[test]
    fn test_write_to() {
        let output = JsonOutput::new(&SearchReport::default());
        let mut buffer = Vec::new();

        output.write_to(&mut buffer, true).unwrap();

        let written = String::from_utf8(buffer).unwrap();
        assert!(written.starts_with('{'));
        assert!(written.ends_with("}\n"));
        assert!(written.contains('\n'));
    }
}
