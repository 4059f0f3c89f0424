//! Scan command - crawl a tree and write the directory map.

use anyhow::Result;
use clap::Args as ClapArgs;
use std::path::{Path, PathBuf};

use dirmap_core::scan::{crawl, ScanOptions};

use super::{absolute_root, throttle_from_ms};
use crate::output::print_scan_summary;
use crate::reports::{write_scan_reports, OutputConfig, ReportFormat};

#[derive(ClapArgs, Clone)]
pub struct Args {
    /// Root directory to crawl.
    #[arg(default_value = ".")]
    pub root: PathBuf,

    /// Explicit worker count (overrides the advisor).
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,

    /// Fast mode: scale the pool more aggressively.
    #[arg(long)]
    pub fast: bool,

    /// Fixed delay after each dispatched listing, in milliseconds.
    #[arg(long)]
    pub throttle_ms: Option<u64>,

    /// Which report files to write.
    #[arg(long, value_enum, default_value_t = ReportFormat::Both)]
    pub format: ReportFormat,
}

pub fn run(args: &Args, out_dir: &Path) -> Result<()> {
    let root = absolute_root(&args.root)?;
    let options = ScanOptions::recommended(args.workers, args.fast)
        .with_throttle(throttle_from_ms(args.throttle_ms));

    let outcome = crawl(&root, &options)?;

    let output = OutputConfig::new(out_dir, args.format);
    let written = write_scan_reports(&output, &outcome)?;

    print_scan_summary(&outcome.stats);
    for path in written {
        println!("report: {}", path.display());
    }
    Ok(())
}
