//! Automation loop: repeat crawls or benchmarks at an interval.
//!
//! A thin driver over [`crawl`](crate::scan::crawl) and
//! [`run_benchmark`](crate::bench::run_benchmark) - no scheduling logic of
//! its own. Each run appends a [`HistoryEntry`]; report persistence is
//! delegated to the caller through the [`RunSink`] seam so the core never
//! touches the filesystem for output.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::info;

use crate::bench::{run_benchmark, BenchOptions};
use crate::error::ScanError;
use crate::scan::{crawl, CrawlOutcome, RunStats, ScanOptions};
use crate::score::weighted_throughput_score;

/// Granularity of the interval sleep, so interruption stays responsive.
const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// Which engine the loop repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutomationMode {
    /// Repeat full crawls.
    Crawl,
    /// Repeat benchmarks.
    Benchmark,
}

impl std::fmt::Display for AutomationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Crawl => write!(f, "crawl"),
            Self::Benchmark => write!(f, "benchmark"),
        }
    }
}

/// Options for the automation loop.
#[derive(Debug, Clone)]
pub struct AutomationOptions {
    /// Engine to repeat.
    pub mode: AutomationMode,
    /// Number of runs.
    pub runs: usize,
    /// Sleep between consecutive runs.
    pub interval: Duration,
    /// Explicit worker override for crawl runs.
    pub workers: Option<usize>,
    /// Fast-mode flag, passed to the advisor and the benchmark.
    pub fast: bool,
    /// Benchmark iterations per candidate (benchmark mode only).
    pub iterations: usize,
    /// Per-dispatch throttle passed through to crawls.
    pub throttle: Option<Duration>,
    /// Cooperative interruption flag, checked between runs and while
    /// sleeping.
    pub shutdown: Option<Arc<AtomicBool>>,
}

impl Default for AutomationOptions {
    fn default() -> Self {
        Self {
            mode: AutomationMode::Crawl,
            runs: 1,
            interval: Duration::from_secs(60),
            workers: None,
            fast: false,
            iterations: 1,
            throttle: None,
            shutdown: None,
        }
    }
}

/// One completed automation run.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// When the run finished.
    pub timestamp: DateTime<Utc>,
    /// Engine that produced it.
    pub mode: AutomationMode,
    /// The run's stats - the crawl itself, or the benchmark winner.
    pub stats: RunStats,
    /// Report reference returned by the sink, if any.
    pub report: Option<PathBuf>,
}

/// Consumer of per-run results, typically a report writer.
///
/// The returned path (if any) is recorded in the history entry as the
/// run's report reference. Both methods default to doing nothing so tests
/// can use a unit sink.
pub trait RunSink {
    /// Called after each crawl run.
    fn on_crawl(&mut self, _outcome: &CrawlOutcome) -> Option<PathBuf> {
        None
    }

    /// Called after each benchmark run with the full ranking.
    fn on_benchmark(&mut self, _ranked: &[RunStats]) -> Option<PathBuf> {
        None
    }
}

/// A sink that discards results.
pub struct NullSink;

impl RunSink for NullSink {}

/// Repeat the chosen engine, recording a history entry per run.
///
/// Stops early (returning the history so far) when the shutdown flag
/// trips. A benchmark run interrupted before any candidate completed
/// produces no entry.
pub fn run_automation(
    root: &Path,
    options: &AutomationOptions,
    sink: &mut dyn RunSink,
) -> Result<Vec<HistoryEntry>, ScanError> {
    let mut history = Vec::with_capacity(options.runs);

    for run in 0..options.runs {
        if interrupted(options.shutdown.as_deref()) {
            break;
        }

        match options.mode {
            AutomationMode::Crawl => {
                let scan_options = ScanOptions::recommended(options.workers, options.fast)
                    .with_throttle(options.throttle);
                let outcome = crawl(root, &scan_options)?;
                let report = sink.on_crawl(&outcome);
                info!(
                    run = run + 1,
                    runs = options.runs,
                    files = outcome.stats.files,
                    "automation crawl finished"
                );
                history.push(HistoryEntry {
                    timestamp: Utc::now(),
                    mode: AutomationMode::Crawl,
                    stats: outcome.stats,
                    report,
                });
            }
            AutomationMode::Benchmark => {
                let bench_options = BenchOptions {
                    iterations: options.iterations,
                    fast: options.fast,
                    throttle: options.throttle,
                    score: weighted_throughput_score,
                    shutdown: options.shutdown.clone(),
                };
                let ranked = run_benchmark(root, &bench_options, None)?;
                let Some(best) = ranked.first().cloned() else {
                    break;
                };
                let report = sink.on_benchmark(&ranked);
                info!(
                    run = run + 1,
                    runs = options.runs,
                    best_workers = best.workers,
                    "automation benchmark finished"
                );
                history.push(HistoryEntry {
                    timestamp: Utc::now(),
                    mode: AutomationMode::Benchmark,
                    stats: best,
                    report,
                });
            }
        }

        if run + 1 < options.runs {
            sleep_interruptibly(options.interval, options.shutdown.as_deref());
        }
    }

    Ok(history)
}

fn interrupted(shutdown: Option<&AtomicBool>) -> bool {
    shutdown.is_some_and(|flag| flag.load(Ordering::SeqCst))
}

/// Sleep for `interval`, waking early if the shutdown flag trips.
fn sleep_interruptibly(interval: Duration, shutdown: Option<&AtomicBool>) {
    let mut remaining = interval;
    while !remaining.is_zero() {
        if interrupted(shutdown) {
            return;
        }
        let slice = remaining.min(SLEEP_SLICE);
        thread::sleep(slice);
        remaining = remaining.saturating_sub(slice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    struct CountingSink {
        crawls: usize,
        benchmarks: usize,
    }

    impl RunSink for CountingSink {
        fn on_crawl(&mut self, _outcome: &CrawlOutcome) -> Option<PathBuf> {
            self.crawls += 1;
            Some(PathBuf::from(format!("report-{}.txt", self.crawls)))
        }

        fn on_benchmark(&mut self, _ranked: &[RunStats]) -> Option<PathBuf> {
            self.benchmarks += 1;
            None
        }
    }

    fn tiny_tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("f.txt")).unwrap();
        dir
    }

    #[test]
    fn test_crawl_history_records_each_run() {
        let tree = tiny_tree();
        let options = AutomationOptions {
            runs: 3,
            interval: Duration::ZERO,
            ..AutomationOptions::default()
        };
        let mut sink = CountingSink {
            crawls: 0,
            benchmarks: 0,
        };
        let history = run_automation(tree.path(), &options, &mut sink).unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(sink.crawls, 3);
        assert!(history.iter().all(|entry| entry.report.is_some()));
        assert!(history
            .iter()
            .all(|entry| entry.mode == AutomationMode::Crawl));
    }

    #[test]
    fn test_benchmark_history_records_winner() {
        let tree = tiny_tree();
        let options = AutomationOptions {
            mode: AutomationMode::Benchmark,
            runs: 2,
            interval: Duration::ZERO,
            ..AutomationOptions::default()
        };
        let mut sink = CountingSink {
            crawls: 0,
            benchmarks: 0,
        };
        let history = run_automation(tree.path(), &options, &mut sink).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(sink.benchmarks, 2);
        assert!(history.iter().all(|entry| entry.stats.files == 1));
    }

    #[test]
    fn test_tripped_shutdown_stops_before_first_run() {
        let tree = tiny_tree();
        let options = AutomationOptions {
            runs: 5,
            interval: Duration::ZERO,
            shutdown: Some(Arc::new(AtomicBool::new(true))),
            ..AutomationOptions::default()
        };
        let history = run_automation(tree.path(), &options, &mut NullSink).unwrap();
        assert!(history.is_empty());
    }
}
