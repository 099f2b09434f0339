//! Batch-parallel predicate evaluation.
//!
//! # Overview
//!
//! [`BatchEvaluator`] splits a file list into contiguous batches of
//! `max(1, len / threads)` entries and evaluates a [`FilePredicate`] over
//! every batch concurrently, one worker per batch. Each worker collects its
//! matches into a private vector; the vectors are concatenated in batch order
//! after all workers have finished, so output order depends only on the input
//! order and the thread count.
//!
//! Because the batch size uses integer division, the number of batches can
//! exceed the thread count when the list length is not a multiple of it
//! (10 files on 3 threads give batches of 3, 3, 3 and 1). This is intended.
//!
//! # Example
//!
//! ```
//! use seekfs::scanner::FileEntry;
//! use seekfs::search::BatchEvaluator;
//! use std::path::{Path, PathBuf};
//!
//! let files: Vec<FileEntry> = ["a.txt", "b.md", "c.txt"]
//!     .iter()
//!     .map(|name| FileEntry::new(PathBuf::from(name), 1))
//!     .collect();
//!
//! let evaluator = BatchEvaluator::new(2);
//! let matches = evaluator.evaluate(&files, &|path: &Path| {
//!     path.extension().is_some_and(|e| e == "txt")
//! });
//! assert_eq!(matches, vec!["a.txt", "c.txt"]);
//! ```

use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rayon::prelude::*;

use super::FilePredicate;
use crate::progress::{ProgressCallback, PHASE_MATCHING};
use crate::scanner::FileEntry;

/// Fixed-thread-count fork-join evaluator.
pub struct BatchEvaluator {
    threads: usize,
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for BatchEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchEvaluator")
            .field("threads", &self.threads)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl BatchEvaluator {
    /// Create an evaluator for `threads` workers. Values below 1 are raised
    /// to 1.
    #[must_use]
    pub fn new(threads: i64) -> Self {
        Self {
            threads: usize::try_from(threads.max(1)).unwrap_or(usize::MAX),
            progress_callback: None,
        }
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Configured thread count (always at least 1).
    #[must_use]
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Number of entries per batch for a list of `len` entries.
    #[must_use]
    pub fn batch_size(&self, len: usize) -> usize {
        (len / self.threads).max(1)
    }

    /// Contiguous index ranges of every batch, in order.
    ///
    /// There are `ceil(len / batch_size)` ranges; the last may be shorter.
    #[must_use]
    pub fn batch_ranges(&self, len: usize) -> Vec<Range<usize>> {
        let batch_size = self.batch_size(len);
        (0..len)
            .step_by(batch_size)
            .map(|start| start..(start + batch_size).min(len))
            .collect()
    }

    /// Evaluate `predicate` over `files` and return the display paths of the
    /// matches, in input order.
    ///
    /// An empty list returns immediately without starting any worker.
    pub fn evaluate<P>(&self, files: &[FileEntry], predicate: &P) -> Vec<String>
    where
        P: FilePredicate + ?Sized,
    {
        if files.is_empty() {
            return Vec::new();
        }

        let ranges = self.batch_ranges(files.len());
        log::debug!(
            "Evaluating {} files in {} batches of up to {} ({} threads requested)",
            files.len(),
            ranges.len(),
            self.batch_size(files.len()),
            self.threads
        );

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_start(PHASE_MATCHING, files.len());
        }

        let processed = AtomicUsize::new(0);
        let run_batch = |range: &Range<usize>| -> Vec<String> {
            let mut matches = Vec::new();
            for file in &files[range.clone()] {
                if predicate.matches(&file.path) {
                    matches.push(file.path_string());
                }
                if let Some(ref callback) = self.progress_callback {
                    let current = processed.fetch_add(1, Ordering::Relaxed) + 1;
                    callback.on_progress(current, &file.path.to_string_lossy());
                }
            }
            matches
        };

        // One worker per batch
        let per_batch: Vec<Vec<String>> = match rayon::ThreadPoolBuilder::new()
            .num_threads(ranges.len())
            .thread_name(|i| format!("seekfs-batch-{i}"))
            .build()
        {
            Ok(pool) => pool.install(|| ranges.par_iter().map(run_batch).collect()),
            Err(e) => {
                log::warn!("Failed to create batch thread pool ({e}), evaluating sequentially");
                ranges.iter().map(run_batch).collect()
            }
        };

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_end(PHASE_MATCHING);
        }

        let results: Vec<String> = per_batch.into_iter().flatten().collect();
        log::info!("{} of {} files matched", results.len(), files.len());
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    fn make_files(count: usize) -> Vec<FileEntry> {
        (0..count)
            .map(|i| FileEntry::new(PathBuf::from(format!("/data/file{i:03}.txt")), i as u64))
            .collect()
    }

    #[test]
    fn test_thread_count_is_coerced() {
        assert_eq!(BatchEvaluator::new(0).threads(), 1);
        assert_eq!(BatchEvaluator::new(-5).threads(), 1);
        assert_eq!(BatchEvaluator::new(8).threads(), 8);
    }

    #[test]
    fn test_batch_ranges_even_split() {
        let evaluator = BatchEvaluator::new(4);
        assert_eq!(evaluator.batch_ranges(8), vec![0..2, 2..4, 4..6, 6..8]);
    }

    #[test]
    fn test_batch_ranges_remainder_adds_batch() {
        let evaluator = BatchEvaluator::new(3);
        assert_eq!(evaluator.batch_size(10), 3);
        assert_eq!(evaluator.batch_ranges(10), vec![0..3, 3..6, 6..9, 9..10]);
    }

    #[test]
    fn test_batch_ranges_more_threads_than_files() {
        let evaluator = BatchEvaluator::new(4);
        assert_eq!(evaluator.batch_size(7), 1);
        assert_eq!(evaluator.batch_ranges(7).len(), 7);

        let evaluator = BatchEvaluator::new(16);
        assert_eq!(evaluator.batch_ranges(3), vec![0..1, 1..2, 2..3]);
    }

    #[test]
    fn test_batch_ranges_empty() {
        assert!(BatchEvaluator::new(4).batch_ranges(0).is_empty());
    }

    #[test]
    fn test_evaluate_empty_list() {
        let calls = AtomicUsize::new(0);
        let predicate = |_: &Path| {
            calls.fetch_add(1, Ordering::SeqCst);
            true
        };

        for threads in [-1, 0, 1, 4, 64] {
            let result = BatchEvaluator::new(threads).evaluate(&[], &predicate);
            assert!(result.is_empty());
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_evaluate_preserves_input_order() {
        let files = make_files(101);
        let expected: Vec<String> = files
            .iter()
            .filter(|f| f.size % 3 == 0)
            .map(FileEntry::path_string)
            .collect();

        let predicate = |path: &Path| {
            let stem = path.file_stem().unwrap().to_string_lossy();
            stem.trim_start_matches("file").parse::<u64>().unwrap() % 3 == 0
        };

        for threads in [1, 2, 3, 7, 16, 200] {
            let result = BatchEvaluator::new(threads).evaluate(&files, &predicate);
            assert_eq!(result, expected, "threads = {threads}");
        }
    }

    #[test]
    fn test_evaluate_visits_every_file_once() {
        let files = make_files(50);
        let seen = Mutex::new(Vec::new());
        let predicate = |path: &Path| {
            seen.lock().unwrap().push(path.to_path_buf());
            false
        };

        let result = BatchEvaluator::new(6).evaluate(&files, &predicate);
        assert!(result.is_empty());

        let mut seen = seen.into_inner().unwrap();
        seen.sort();
        let mut expected: Vec<_> = files.iter().map(|f| f.path.clone()).collect();
        expected.sort();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_evaluate_reports_progress_counter() {
        struct MaxCounter(AtomicUsize, AtomicUsize);
        impl ProgressCallback for MaxCounter {
            fn on_phase_start(&self, _phase: &str, total: usize) {
                self.1.store(total, Ordering::SeqCst);
            }
            fn on_progress(&self, current: usize, _path: &str) {
                self.0.fetch_max(current, Ordering::SeqCst);
            }
            fn on_phase_end(&self, _phase: &str) {}
        }

        let files = make_files(20);
        let counter = Arc::new(MaxCounter(AtomicUsize::new(0), AtomicUsize::new(0)));
        let evaluator = BatchEvaluator::new(4).with_progress_callback(counter.clone());
        evaluator.evaluate(&files, &|_: &Path| true);

        assert_eq!(counter.0.load(Ordering::SeqCst), 20);
        assert_eq!(counter.1.load(Ordering::SeqCst), 20);
    }
}
