//! Auto command - repeat scans or benchmarks at an interval.

use anyhow::Result;
use clap::{Args as ClapArgs, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use dirmap_core::automation::{
    run_automation, AutomationMode, AutomationOptions, RunSink,
};
use dirmap_core::scan::{CrawlOutcome, RunStats};

use super::{absolute_root, throttle_from_ms};
use crate::reports::{
    write_auto_report, write_bench_reports, write_scan_reports, OutputConfig, ReportFormat,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Mode {
    /// Repeat full crawls.
    #[default]
    Crawl,
    /// Repeat benchmarks.
    Bench,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Crawl => write!(f, "crawl"),
            Self::Bench => write!(f, "bench"),
        }
    }
}

#[derive(ClapArgs, Clone)]
pub struct Args {
    /// Root directory to work on.
    #[arg(default_value = ".")]
    pub root: PathBuf,

    /// Engine to repeat.
    #[arg(long, value_enum, default_value_t = Mode::Crawl)]
    pub mode: Mode,

    /// Number of runs.
    #[arg(long, default_value = "3")]
    pub runs: usize,

    /// Sleep between runs, in seconds.
    #[arg(long, default_value = "60")]
    pub interval_secs: u64,

    /// Explicit worker count for crawl runs.
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,

    /// Fast mode.
    #[arg(long)]
    pub fast: bool,

    /// Benchmark iterations per candidate (bench mode only).
    #[arg(short = 'i', long, default_value = "1")]
    pub iterations: usize,

    /// Fixed delay after each dispatched listing, in milliseconds.
    #[arg(long)]
    pub throttle_ms: Option<u64>,

    /// Which report files each run writes.
    #[arg(long, value_enum, default_value_t = ReportFormat::Both)]
    pub format: ReportFormat,
}

/// Sink that persists each run through the report writers.
struct ReportSink {
    output: OutputConfig,
    root: PathBuf,
    iterations: usize,
}

impl RunSink for ReportSink {
    fn on_crawl(&mut self, outcome: &CrawlOutcome) -> Option<PathBuf> {
        match write_scan_reports(&self.output, outcome) {
            Ok(written) => written.into_iter().next(),
            Err(error) => {
                tracing::warn!(%error, "failed to write crawl report");
                None
            }
        }
    }

    fn on_benchmark(&mut self, ranked: &[RunStats]) -> Option<PathBuf> {
        match write_bench_reports(&self.output, &self.root, self.iterations, ranked) {
            Ok(written) => written.into_iter().next(),
            Err(error) => {
                tracing::warn!(%error, "failed to write benchmark report");
                None
            }
        }
    }
}

pub fn run(args: &Args, out_dir: &Path, shutdown: &Arc<AtomicBool>) -> Result<()> {
    let root = absolute_root(&args.root)?;
    let mode = match args.mode {
        Mode::Crawl => AutomationMode::Crawl,
        Mode::Bench => AutomationMode::Benchmark,
    };

    let options = AutomationOptions {
        mode,
        runs: args.runs.max(1),
        interval: Duration::from_secs(args.interval_secs),
        workers: args.workers,
        fast: args.fast,
        iterations: args.iterations.max(1),
        throttle: throttle_from_ms(args.throttle_ms),
        shutdown: Some(Arc::clone(shutdown)),
    };

    println!(
        "automation: {} x{} every {}s on {}",
        mode,
        options.runs,
        args.interval_secs,
        root.display()
    );

    let mut sink = ReportSink {
        output: OutputConfig::new(out_dir, args.format),
        root: root.clone(),
        iterations: options.iterations,
    };
    let history = run_automation(&root, &options, &mut sink)?;

    for (run, entry) in history.iter().enumerate() {
        println!(
            "{}. [{}] {} workers={} ms={} files={} score={:.2}{}",
            run + 1,
            entry.timestamp.format("%H:%M:%S"),
            entry.mode,
            entry.stats.workers,
            entry.stats.elapsed.as_millis(),
            entry.stats.files,
            entry.stats.score,
            entry
                .report
                .as_ref()
                .map(|p| format!(" report={}", p.display()))
                .unwrap_or_default(),
        );
    }

    if history.is_empty() {
        println!("no runs completed");
        return Ok(());
    }

    let output = OutputConfig::new(out_dir, args.format);
    let path = write_auto_report(&output, &root, &history)?;
    println!("history: {}", path.display());
    Ok(())
}
