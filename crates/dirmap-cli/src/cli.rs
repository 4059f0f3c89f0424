//! Command-line interface definition.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::{auto, bench, disk, scan, workers};

/// Concurrent filesystem tree mapper and worker-count benchmark.
///
/// Maps a directory tree with a bounded worker pool, benchmarks candidate
/// pool sizes to recommend a concurrency setting for this machine, and can
/// repeat either at an interval. Without a subcommand an interactive menu
/// is shown.
#[derive(Parser)]
#[command(name = "dirmap")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Directory where reports are written.
    #[arg(short = 'o', long, global = true, default_value = "dirmap-out")]
    pub out: PathBuf,

    /// Verbose logging.
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Crawl a tree and write the directory map.
    Scan(scan::Args),
    /// Benchmark candidate worker counts and rank them.
    Bench(bench::Args),
    /// Raw sequential disk read/write micro-benchmark.
    Disk(disk::Args),
    /// Repeat scans or benchmarks at an interval.
    Auto(auto::Args),
    /// Print the recommended worker count for this machine.
    Workers(workers::Args),
}
