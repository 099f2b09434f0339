//! Human-readable output.
//!
//! Each query gets a boxed header followed by a tree of paths:
//!
//! ```text
//! +---------------+
//! |  NAME SEARCH  |
//! +---------------+
//! Pattern: file.*\.txt
//!
//! Matching files (2)
//! `--
//!    |-- ./file1.txt
//!    `-- ./file2.txt
//! ```
//!
//! Duplicate groups show the first 16 hex characters of the digest. Colors
//! come from `yansi` and follow its global enable state.

use std::io::{self, Write};

use yansi::Paint;

use super::{sorted_groups, MatchReport, SearchReport};

/// Digest characters shown per duplicate group.
pub const DIGEST_PREFIX_LEN: usize = 16;

/// Text renderer for a [`SearchReport`].
#[derive(Debug)]
pub struct TextOutput<'a> {
    report: &'a SearchReport,
}

impl<'a> TextOutput<'a> {
    /// Create a renderer for `report`.
    #[must_use]
    pub fn new(report: &'a SearchReport) -> Self {
        Self { report }
    }

    /// Write every successful query result.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        if let Some(ref name) = self.report.name {
            write_header(writer, "NAME SEARCH")?;
            write_matches(
                writer,
                name,
                "Matching files",
                "No files match the name pattern",
            )?;
        }

        if let Some(ref content) = self.report.content {
            write_header(writer, "CONTENT SEARCH")?;
            write_matches(
                writer,
                content,
                "Files with matching content",
                "No files contain the content pattern",
            )?;
        }

        if let Some(ref duplicates) = self.report.duplicates {
            write_header(writer, "DUPLICATES")?;
            if duplicates.is_empty() {
                writeln!(writer, "No duplicate files found")?;
            }
            for (index, (digest, files)) in sorted_groups(duplicates).into_iter().enumerate() {
                let prefix: String = digest.chars().take(DIGEST_PREFIX_LEN).collect();
                writeln!(writer)?;
                writeln!(
                    writer,
                    "{} (Hash: {}...)",
                    format!("Duplicate Group #{}", index + 1).bold(),
                    prefix.yellow()
                )?;
                write_tree(writer, files)?;
            }
        }

        Ok(())
    }

    /// Write one line per failed query.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_errors_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let code = self.report.exit_code().code_prefix();
        for failure in &self.report.errors {
            writeln!(
                writer,
                "[{}] {} Error when searching by {}: {}",
                code,
                "✗".red(),
                failure.query,
                failure.message
            )?;
        }
        Ok(())
    }
}

/// Write the notice shown when no query was requested.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_no_criteria<W: Write>(writer: &mut W) -> io::Result<()> {
    write_header(writer, "INFO")?;
    writeln!(
        writer,
        "No search criteria specified. Use --name, --content or --duplicates (see --help)."
    )
}

fn write_header<W: Write>(writer: &mut W, title: &str) -> io::Result<()> {
    let rule = format!("+{}+", "-".repeat(title.len() + 4));
    writeln!(writer)?;
    writeln!(writer, "{}", rule.dim())?;
    writeln!(writer, "{}  {}  {}", "|".dim(), title.bold(), "|".dim())?;
    writeln!(writer, "{}", rule.dim())
}

fn write_matches<W: Write>(
    writer: &mut W,
    matches: &MatchReport,
    title: &str,
    empty_message: &str,
) -> io::Result<()> {
    writeln!(writer, "Pattern: {}", matches.pattern)?;
    if matches.files.is_empty() {
        return writeln!(writer, "{empty_message}");
    }
    writeln!(writer)?;
    writeln!(
        writer,
        "{} ({})",
        title.bold(),
        matches.files.len().green()
    )?;
    write_tree(writer, &matches.files)
}

fn write_tree<W: Write>(writer: &mut W, files: &[String]) -> io::Result<()> {
    writeln!(writer, "`--")?;
    for (i, file) in files.iter().enumerate() {
        let branch = if i + 1 == files.len() { "`--" } else { "|--" };
        writeln!(writer, "   {branch} {file}")?;
    }
    Ok(())
}
