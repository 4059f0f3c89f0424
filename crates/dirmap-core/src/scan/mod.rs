//! Breadth-first concurrent directory crawling.
//!
//! [`crawl`] walks the tree under a root with a fixed worker pool, bounded
//! by an admission limit so the number of outstanding directory listings
//! stays capped regardless of tree width. Results arrive as a [`ResultMap`]
//! (directory path -> files directly inside it) and a [`RunStats`] record.

mod lister;
mod scheduler;

pub use lister::{list_directory, DirListing};
pub use scheduler::{admission_limit, crawl};

use crate::score::{weighted_throughput_score, ScoreFn};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Directory path -> ordered file paths found directly inside it.
///
/// Each reachable directory is a key exactly once; the key is reserved when
/// the directory is discovered, before its listing completes, so a path can
/// never be scheduled twice. A `BTreeMap` keeps downstream report output
/// deterministic.
pub type ResultMap = BTreeMap<PathBuf, Vec<PathBuf>>;

/// Options for a single crawl.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Worker pool size.
    pub workers: usize,
    /// Optional fixed delay after each dispatch, to rate-limit syscall
    /// pressure. Affects wall-clock time only, never results.
    pub throttle: Option<Duration>,
    /// Ranking function applied to the finished stats.
    pub score: ScoreFn,
}

impl ScanOptions {
    /// Options for a pool of the given size.
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            throttle: None,
            score: weighted_throughput_score,
        }
    }

    /// Options with a pool sized by the advisor for the current host.
    pub fn recommended(override_workers: Option<usize>, fast: bool) -> Self {
        Self::new(crate::advisor::recommend_workers(override_workers, fast))
    }

    /// Set the per-dispatch throttle delay.
    #[must_use]
    pub fn with_throttle(mut self, throttle: Option<Duration>) -> Self {
        self.throttle = throttle;
        self
    }

    /// Swap the ranking function.
    #[must_use]
    pub fn with_score(mut self, score: ScoreFn) -> Self {
        self.score = score;
        self
    }
}

/// Statistics for one completed crawl. Immutable once produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunStats {
    /// Root the crawl started from.
    pub root: PathBuf,
    /// Worker pool size used.
    pub workers: usize,
    /// Wall-clock time from loop entry to termination.
    pub elapsed: Duration,
    /// Subdirectories discovered (the root itself is not counted).
    pub folders: u64,
    /// Files recorded across all directories.
    pub files: u64,
    /// Deepest BFS level reached (root = 0).
    pub max_depth: u64,
    /// Files enumerated per second of wall-clock time.
    pub files_per_sec: f64,
    /// Permission failures encountered.
    pub permission_denied: u64,
    /// Other I/O failures encountered.
    pub other_errors: u64,
    /// Advisory ranking score.
    pub score: f64,
}

/// A finished crawl: the directory map plus its stats.
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    /// Directory -> files map for the full reachable tree.
    pub map: ResultMap,
    /// Aggregated statistics.
    pub stats: RunStats,
}
