//! Bench command - rank candidate worker counts for a tree.

use anyhow::Result;
use clap::Args as ClapArgs;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use dirmap_core::advisor::candidate_workers;
use dirmap_core::bench::{run_benchmark, BenchOptions, BenchProgress};
use dirmap_core::host::detected_cores;
use dirmap_core::score::weighted_throughput_score;

use super::{absolute_root, throttle_from_ms};
use crate::output::render_ranking_table;
use crate::reports::{write_bench_reports, OutputConfig, ReportFormat};

#[derive(ClapArgs, Clone)]
pub struct Args {
    /// Root directory to benchmark against.
    #[arg(default_value = ".")]
    pub root: PathBuf,

    /// Crawl iterations per candidate worker count.
    #[arg(short = 'i', long, default_value = "1")]
    pub iterations: usize,

    /// Fast mode: widen the candidate set with a fast-scaled upper value.
    #[arg(long)]
    pub fast: bool,

    /// Fixed delay after each dispatched listing, in milliseconds.
    #[arg(long)]
    pub throttle_ms: Option<u64>,

    /// Which report files to write.
    #[arg(long, value_enum, default_value_t = ReportFormat::Both)]
    pub format: ReportFormat,
}

pub fn run(args: &Args, out_dir: &Path, shutdown: &Arc<AtomicBool>) -> Result<()> {
    let root = absolute_root(&args.root)?;
    let iterations = args.iterations.max(1);

    let candidates = candidate_workers(args.fast, detected_cores());
    println!(
        "benchmarking {} with workers {:?}, {} iteration(s) each",
        root.display(),
        candidates,
        iterations
    );

    let progress = ProgressBar::new((candidates.len() * iterations) as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    let on_progress = |update: BenchProgress| {
        progress.set_message(format!("workers={}", update.workers));
        progress.inc(1);
    };

    let options = BenchOptions {
        iterations,
        fast: args.fast,
        throttle: throttle_from_ms(args.throttle_ms),
        score: weighted_throughput_score,
        shutdown: Some(Arc::clone(shutdown)),
    };
    let ranked = run_benchmark(&root, &options, Some(&on_progress))?;
    progress.finish_and_clear();

    if ranked.is_empty() {
        println!("benchmark interrupted before any candidate completed");
        return Ok(());
    }

    println!("{}", render_ranking_table(&ranked));

    let output = OutputConfig::new(out_dir, args.format);
    let written = write_bench_reports(&output, &root, iterations, &ranked)?;
    for path in &written {
        println!("report: {}", path.display());
    }

    let best = &ranked[0];
    println!(
        "best workers={} avg_ms={} files/s={:.2} score={:.2}",
        best.workers,
        best.elapsed.as_millis(),
        best.files_per_sec,
        best.score
    );
    Ok(())
}
