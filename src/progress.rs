//! Progress reporting utilities using indicatif.
//!
//! The pipeline reports progress through the [`ProgressCallback`] trait. The
//! callback receives an incrementing counter per processed item; it never
//! influences results. [`Progress`] renders those updates as terminal
//! spinners and bars for the command-line front end.
//!
//! Phases reported by the pipeline:
//! - `"scanning"`: one tick per accepted file (total unknown, reported as 0)
//! - `"matching"`: one tick per file evaluated by a name/content predicate
//! - `"hashing"`: one tick per candidate file whose content is digested

use std::sync::Mutex;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Phase name used while enumerating files.
pub const PHASE_SCANNING: &str = "scanning";
/// Phase name used while evaluating search predicates.
pub const PHASE_MATCHING: &str = "matching";
/// Phase name used while digesting duplicate candidates.
pub const PHASE_HASHING: &str = "hashing";

/// Progress callback for pipeline phases.
///
/// Implementations must be thread-safe: during a search, `on_progress` is
/// called concurrently from every batch worker.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts.
    ///
    /// # Arguments
    ///
    /// * `phase` - Name of the phase (see the `PHASE_*` constants)
    /// * `total` - Total number of items, or 0 when unknown
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Called for each item processed.
    ///
    /// # Arguments
    ///
    /// * `current` - Items processed so far in this phase (1-based)
    /// * `path` - Path being processed
    fn on_progress(&self, current: usize, path: &str);

    /// Called when a phase completes.
    fn on_phase_end(&self, phase: &str);
}

/// Terminal progress reporter.
///
/// Only one phase is active at a time, so a single bar slot is enough.
pub struct Progress {
    active: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, nothing is drawn.
    ///
    /// # Examples
    ///
    /// ```
    /// use seekfs::progress::Progress;
    ///
    /// let progress = Progress::new(false);
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            active: Mutex::new(None),
            quiet,
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}] {pos} files")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("◐◓◑◒ ")
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }

    fn replace_active(&self, bar: Option<ProgressBar>) -> Option<ProgressBar> {
        match self.active.lock() {
            Ok(mut slot) => std::mem::replace(&mut *slot, bar),
            Err(poisoned) => std::mem::replace(&mut *poisoned.into_inner(), bar),
        }
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.quiet {
            return;
        }

        let pb = if phase == PHASE_SCANNING || total == 0 {
            let pb = ProgressBar::new_spinner();
            pb.set_style(Self::spinner_style());
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        } else {
            let pb = ProgressBar::new(total as u64);
            pb.set_style(Self::bar_style());
            pb
        };
        pb.set_draw_target(ProgressDrawTarget::stderr());
        pb.set_message(phase_label(phase));

        if let Some(previous) = self.replace_active(Some(pb)) {
            previous.finish_and_clear();
        }
    }

    fn on_progress(&self, current: usize, path: &str) {
        if self.quiet {
            return;
        }

        if let Ok(slot) = self.active.lock() {
            if let Some(ref pb) = *slot {
                // Workers finish out of order; never move the bar backwards.
                if current as u64 > pb.position() {
                    pb.set_position(current as u64);
                }
                if pb.length().is_some() {
                    pb.set_message(truncate_path(path, 30));
                }
            }
        }
    }

    fn on_phase_end(&self, phase: &str) {
        if self.quiet {
            return;
        }

        if let Some(pb) = self.replace_active(None) {
            pb.finish_and_clear();
            log::debug!("{} finished after {} items", phase_label(phase), pb.position());
        }
    }
}

fn phase_label(phase: &str) -> String {
    match phase {
        PHASE_SCANNING => "Scanning".to_string(),
        PHASE_MATCHING => "Matching".to_string(),
        PHASE_HASHING => "Hashing".to_string(),
        other => other.to_string(),
    }
}

/// Truncate a path for display in the progress bar.
fn truncate_path(path: &str, max_len: usize) -> String {
    if path.chars().count() <= max_len {
        return path.to_string();
    }

    let file_name = std::path::Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let name_len = file_name.chars().count();
    if name_len + 4 > max_len {
        let tail: String = file_name
            .chars()
            .skip(name_len.saturating_sub(max_len.saturating_sub(3)))
            .collect();
        return format!("...{tail}");
    }

    format!(".../{file_name}")
}
