//! Worker-count benchmark engine.
//!
//! Runs the crawler across the candidate worker counts, several iterations
//! each, and ranks the averaged results ascending by elapsed time. The
//! first entry of the ranking is the recommended profile for the host.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::advisor::candidate_workers;
use crate::error::ScanError;
use crate::host::detected_cores;
use crate::scan::{crawl, RunStats, ScanOptions};
use crate::score::{weighted_throughput_score, ScoreFn};

/// Options for a benchmark run.
#[derive(Debug, Clone)]
pub struct BenchOptions {
    /// Crawl iterations per candidate worker count.
    pub iterations: usize,
    /// Fast mode: widens the candidate set with the fast-scaled upper value.
    pub fast: bool,
    /// Per-dispatch throttle passed through to each crawl.
    pub throttle: Option<Duration>,
    /// Ranking function passed through to each crawl.
    pub score: ScoreFn,
    /// Cooperative interruption flag, checked between iterations. A single
    /// crawl always runs to completion.
    pub shutdown: Option<Arc<AtomicBool>>,
}

impl Default for BenchOptions {
    fn default() -> Self {
        Self {
            iterations: 1,
            fast: false,
            throttle: None,
            score: weighted_throughput_score,
            shutdown: None,
        }
    }
}

impl BenchOptions {
    fn interrupted(&self) -> bool {
        self.shutdown
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }
}

/// Progress notification emitted after every completed iteration.
#[derive(Debug, Clone, Copy)]
pub struct BenchProgress {
    /// Index of the current candidate (0-based).
    pub candidate_index: usize,
    /// Total number of candidates.
    pub candidate_count: usize,
    /// Worker count being measured.
    pub workers: usize,
    /// Completed iterations for this candidate.
    pub iteration: usize,
    /// Iterations per candidate.
    pub iterations: usize,
    /// Elapsed time of the iteration that just finished.
    pub elapsed: Duration,
}

/// Callback for benchmark progress updates.
pub type BenchProgressCallback<'a> = &'a dyn Fn(BenchProgress);

/// Benchmark the crawl across candidate worker counts.
///
/// Returns one averaged [`RunStats`] per candidate, sorted ascending by
/// average elapsed time - entry 0 is the fastest. Elapsed time, throughput
/// and score are averaged across iterations; the structural counts
/// (folders, files, depth, error counters) are retained from the last run,
/// since they are invariant across repeated scans of an unchanged tree.
///
/// When the shutdown flag trips mid-run the ranking of the candidates
/// measured so far is returned; it is well-formed, just shorter.
pub fn run_benchmark(
    root: &Path,
    options: &BenchOptions,
    progress: Option<BenchProgressCallback<'_>>,
) -> Result<Vec<RunStats>, ScanError> {
    let iterations = options.iterations.max(1);
    let candidates = candidate_workers(options.fast, detected_cores());
    info!(
        root = %root.display(),
        candidates = ?candidates,
        iterations,
        "starting benchmark"
    );

    let mut ranked: Vec<RunStats> = Vec::with_capacity(candidates.len());

    'candidates: for (candidate_index, &workers) in candidates.iter().enumerate() {
        let scan_options = ScanOptions::new(workers)
            .with_throttle(options.throttle)
            .with_score(options.score);

        let mut elapsed_total = Duration::ZERO;
        let mut fps_total = 0.0;
        let mut score_total = 0.0;
        let mut last_stats: Option<RunStats> = None;

        for iteration in 0..iterations {
            if options.interrupted() {
                debug!(workers, iteration, "benchmark interrupted");
                finish_candidate(
                    &mut ranked,
                    last_stats,
                    elapsed_total,
                    fps_total,
                    score_total,
                    iteration,
                );
                break 'candidates;
            }

            let outcome = crawl(root, &scan_options)?;
            let stats = outcome.stats;
            elapsed_total += stats.elapsed;
            fps_total += stats.files_per_sec;
            score_total += stats.score;

            if let Some(callback) = progress {
                callback(BenchProgress {
                    candidate_index,
                    candidate_count: candidates.len(),
                    workers,
                    iteration: iteration + 1,
                    iterations,
                    elapsed: stats.elapsed,
                });
            }
            last_stats = Some(stats);
        }

        finish_candidate(
            &mut ranked,
            last_stats,
            elapsed_total,
            fps_total,
            score_total,
            iterations,
        );
    }

    ranked.sort_by(|a, b| a.elapsed.cmp(&b.elapsed));
    if let Some(best) = ranked.first() {
        info!(
            workers = best.workers,
            elapsed_ms = best.elapsed.as_millis() as u64,
            "benchmark complete"
        );
    }
    Ok(ranked)
}

/// Fold a candidate's completed iterations into one averaged entry.
///
/// `completed` may be short of the configured iteration count when the run
/// was interrupted; a candidate with no completed iterations is dropped.
fn finish_candidate(
    ranked: &mut Vec<RunStats>,
    last_stats: Option<RunStats>,
    elapsed_total: Duration,
    fps_total: f64,
    score_total: f64,
    completed: usize,
) {
    let Some(mut stats) = last_stats else {
        return;
    };
    let completed = completed.max(1) as u32;
    stats.elapsed = elapsed_total / completed;
    stats.files_per_sec = fps_total / f64::from(completed);
    stats.score = score_total / f64::from(completed);
    ranked.push(stats);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    fn small_tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for sub in ["a", "b"] {
            let subdir = dir.path().join(sub);
            std::fs::create_dir(&subdir).unwrap();
            File::create(subdir.join("file.txt")).unwrap();
        }
        dir
    }

    #[test]
    fn test_ranking_sorted_by_elapsed() {
        let tree = small_tree();
        let options = BenchOptions {
            iterations: 2,
            ..BenchOptions::default()
        };
        let ranked = run_benchmark(tree.path(), &options, None).unwrap();
        assert!(!ranked.is_empty());
        assert!(ranked.windows(2).all(|w| w[0].elapsed <= w[1].elapsed));
    }

    #[test]
    fn test_structural_counts_survive_averaging() {
        let tree = small_tree();
        let options = BenchOptions {
            iterations: 3,
            ..BenchOptions::default()
        };
        let ranked = run_benchmark(tree.path(), &options, None).unwrap();
        for stats in &ranked {
            assert_eq!(stats.folders, 2);
            assert_eq!(stats.files, 2);
            assert_eq!(stats.max_depth, 1);
        }
    }

    #[test]
    fn test_progress_fires_per_iteration() {
        use std::sync::atomic::AtomicUsize;

        let tree = small_tree();
        let options = BenchOptions {
            iterations: 2,
            ..BenchOptions::default()
        };
        let calls = AtomicUsize::new(0);
        let count_progress = |_p: BenchProgress| {
            calls.fetch_add(1, Ordering::SeqCst);
        };
        let ranked = run_benchmark(tree.path(), &options, Some(&count_progress)).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), ranked.len() * 2);
    }

    #[test]
    fn test_tripped_shutdown_yields_empty_ranking() {
        let tree = small_tree();
        let options = BenchOptions {
            shutdown: Some(Arc::new(AtomicBool::new(true))),
            ..BenchOptions::default()
        };
        let ranked = run_benchmark(tree.path(), &options, None).unwrap();
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_missing_root_fails_before_work() {
        let tree = small_tree();
        let missing = tree.path().join("missing");
        let result = run_benchmark(&missing, &BenchOptions::default(), None);
        assert!(result.is_err());
    }
}
