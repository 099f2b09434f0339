//! SeekFS - parallel file search and duplicate detection
//!
//! Scans a directory tree and answers three queries: which files match a
//! name pattern, which files contain a content pattern, and which files are
//! byte-for-byte duplicates of each other (compared with a built-in MD5
//! digest).
//!
//! The library entry point is [`searcher::FileSearcher`]; the `seekfs` binary
//! is a thin wrapper around [`run_app`].

pub mod cli;
pub mod config;
pub mod digest;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod search;
pub mod searcher;

use std::io::{self, IsTerminal, Write};
use std::sync::Arc;

use anyhow::{bail, Context};

use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::error::ExitCode;
use crate::output::{JsonOutput, SearchReport, TextOutput};
use crate::progress::Progress;
use crate::searcher::FileSearcher;

/// Build the effective configuration for `cli`.
///
/// Layers defaults, the TOML file (`--config` or the default location) and
/// `SEEKFS_*` environment variables, then applies the command-line flags.
/// The result is not validated; [`run_app`] does that.
#[must_use]
pub fn resolve_config(cli: &Cli) -> Config {
    let mut config = match cli.config {
        Some(ref path) => Config::load_from_path(path),
        None => Config::load(),
    };
    config.merge_cli(cli);
    config
}

/// Run the application with a resolved `config`, writing results to stdout.
///
/// # Errors
///
/// Returns an error for invalid arguments or configuration, or when output
/// cannot be written. A failing query is not an error: it is reported and
/// reflected in the returned [`ExitCode`].
pub fn run_app(cli: Cli, config: Config) -> anyhow::Result<ExitCode> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_app_with_writer(cli, config, &mut out)
}

/// Run the application with a resolved `config`, writing results to `out`.
///
/// Queries run in the order name, content, duplicates; a failing query does
/// not stop the others.
///
/// # Errors
///
/// See [`run_app`].
pub fn run_app_with_writer<W: Write>(
    cli: Cli,
    config: Config,
    out: &mut W,
) -> anyhow::Result<ExitCode> {
    if cli.no_color || !io::stdout().is_terminal() {
        yansi::disable();
    }

    config.validate()?;
    log::debug!("Effective configuration: {:?}", config);

    if cli.save_config {
        match cli.config {
            Some(ref path) => config.save_to_path(path)?,
            None => {
                config.save()?;
            }
        }
    }

    if !cli.path.exists() {
        bail!("Path '{}' does not exist", cli.path.display());
    }
    if !cli.path.is_dir() {
        bail!("'{}' is not a directory", cli.path.display());
    }

    if !cli.has_query() {
        log::info!("No search criteria specified");
        match config.output {
            OutputFormat::Text => output::text::write_no_criteria(out)?,
            OutputFormat::Json => JsonOutput::new(&SearchReport::default()).write_to(out, true)?,
        }
        return Ok(ExitCode::Success);
    }

    let mut searcher = FileSearcher::new(&cli.path, config.threads)
        .with_context(|| format!("Failed to open {}", cli.path.display()))?;
    searcher.set_case_sensitive(!config.ignore_case);
    searcher.set_max_file_size(config.max_file_size())?;
    searcher.set_allowed_extensions(&config.types);
    if config.progress {
        searcher = searcher.with_progress_callback(Arc::new(Progress::new(cli.quiet)));
    }

    log::info!(
        "Searching {} with {} threads",
        cli.path.display(),
        searcher.thread_count()
    );

    let mut report = SearchReport::default();
    if let Some(ref pattern) = cli.name {
        report.record_name(pattern, searcher.search_by_name(pattern));
    }
    if let Some(ref pattern) = cli.content {
        report.record_content(pattern, searcher.search_by_content(pattern));
    }
    if cli.duplicates {
        report.record_duplicates(searcher.find_duplicates());
    }

    match config.output {
        OutputFormat::Text => {
            let text = TextOutput::new(&report);
            text.write_to(out)?;
            text.write_errors_to(&mut io::stderr())?;
        }
        OutputFormat::Json => JsonOutput::new(&report).write_to(out, true)?,
    }
    out.flush()?;

    Ok(report.exit_code())
}
