//! Concurrent filesystem tree crawler and worker-count benchmark engine.
//!
//! This crate enumerates a directory tree breadth-first using an
//! admission-controlled worker pool, and measures how crawl throughput
//! varies with pool size to recommend a concurrency setting for the
//! host machine.
//!
//! # Components
//!
//! - [`scan`] - the bounded-fanout crawler: [`crawl`] drives a FIFO queue
//!   of directories through a fixed worker pool and aggregates a
//!   [`ResultMap`] plus [`RunStats`]
//! - [`advisor`] - pure worker-count recommendation from the host core count
//! - [`bench`] - runs the crawler across candidate worker counts and ranks
//!   the averaged results
//! - [`automation`] - repeats crawls or benchmarks at an interval,
//!   accumulating a history
//!
//! Report formatting and persistence are deliberately out of scope; callers
//! receive the raw [`ResultMap`] and [`RunStats`] records.

pub mod advisor;
pub mod automation;
pub mod bench;
pub mod error;
pub mod host;
pub mod scan;
pub mod score;

pub use advisor::{candidate_workers, recommend_workers, MAX_WORKERS};
pub use automation::{
    run_automation, AutomationMode, AutomationOptions, HistoryEntry, NullSink, RunSink,
};
pub use bench::{run_benchmark, BenchOptions, BenchProgress};
pub use error::ScanError;
pub use host::HostInfo;
pub use scan::{crawl, CrawlOutcome, ResultMap, RunStats, ScanOptions};
pub use score::{weighted_throughput_score, ScoreFn};
