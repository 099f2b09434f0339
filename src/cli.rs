//! Command-line interface definitions for seekfs.
//!
//! All options live on a single flat command: each of `--name`, `--content`
//! and `--duplicates` requests one query, and any combination may be given.
//! Options left unset fall back to the configuration file and environment
//! (see [`crate::config::Config`]).
//!
//! # Example
//!
//! ```bash
//! # Text files by name
//! seekfs -n '.*\.txt$'
//!
//! # Case-insensitive content search with a progress bar
//! seekfs -c TODO -i --progress
//!
//! # Duplicates under ~/Downloads using 8 threads, as JSON
//! seekfs -p ~/Downloads -d -t 8 --output json
//! ```

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Parallel file search by name or content, plus duplicate detection.
#[derive(Debug, Parser)]
#[command(name = "seekfs")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "Examples:\n  \
    seekfs -n \".*\\.txt$\"\n  \
    seekfs -c \"TODO\" -i --progress\n  \
    seekfs -d -t 8 --progress")]
pub struct Cli {
    /// Directory to search
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub path: PathBuf,

    /// File name pattern (regex, matched anywhere in the base name)
    #[arg(short, long, value_name = "REGEX")]
    pub name: Option<String>,

    /// Content pattern (regex, matched against each line)
    #[arg(short, long, value_name = "REGEX")]
    pub content: Option<String>,

    /// Find files with identical content and identical names
    #[arg(short, long)]
    pub duplicates: bool,

    /// Case-insensitive pattern matching
    #[arg(short, long)]
    pub ignore_case: bool,

    /// Show progress bars on stderr
    #[arg(long)]
    pub progress: bool,

    /// Number of worker threads for name and content search (default: 4)
    #[arg(short, long, value_name = "N", allow_negative_numbers = true)]
    pub threads: Option<i64>,

    /// Skip files larger than this many megabytes (default: 100)
    #[arg(long, value_name = "MB")]
    pub max_size: Option<u64>,

    /// Only consider these extensions (comma separated, e.g. "rs,toml")
    #[arg(long = "type", value_name = "EXT,...", value_delimiter = ',')]
    pub types: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Read settings from this TOML file instead of the default location
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write the effective settings to the configuration file and continue
    #[arg(long)]
    pub save_config: bool,

    /// Increase verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all log output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,
}

impl Cli {
    /// Whether any query was requested.
    #[must_use]
    pub fn has_query(&self) -> bool {
        self.name.is_some() || self.content.is_some() || self.duplicates
    }
}

/// Output format for search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable listing
    #[default]
    Text,
    /// One JSON document for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
