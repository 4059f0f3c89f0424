//! Disk command - raw sequential read/write micro-benchmark.
//!
//! Independent of the crawler: writes and reads back a single large blob,
//! then churns small files, to characterize the disk the reports live on.
//! Results only feed the JSON report, nothing else consumes them.

use anyhow::{Context, Result};
use chrono::Local;
use clap::Args as ClapArgs;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::debug;

use crate::reports::{write_disk_report, DiskReport, OutputConfig, ReportFormat};

/// Size of the sequential blob, in MiB.
const BLOB_MB: usize = 64;

/// Block size for sequential I/O.
const BLOCK_SIZE: usize = 1024 * 1024;

/// Number of small files for the create/delete churn.
const CHURN_FILES: usize = 300;

/// Size of each churn file.
const CHURN_FILE_SIZE: usize = 1024;

#[derive(ClapArgs, Clone)]
pub struct Args {
    /// Directory to benchmark (default: the report output directory).
    #[arg(long)]
    pub path: Option<PathBuf>,
}

pub fn run(args: &Args, out_dir: &Path) -> Result<()> {
    let output = OutputConfig::new(out_dir, ReportFormat::Json);
    output.ensure_dir()?;

    let base = args.path.clone().unwrap_or_else(|| out_dir.to_path_buf());
    let scratch = base.join(format!(
        "disk_scratch_{}",
        Local::now().format("%Y-%m-%d_%H-%M-%S")
    ));
    fs::create_dir_all(&scratch)
        .with_context(|| format!("failed to create scratch directory {}", scratch.display()))?;

    let result = measure(&scratch, &base);
    // Best-effort cleanup regardless of how the measurement went.
    if let Err(error) = fs::remove_dir_all(&scratch) {
        debug!(scratch = %scratch.display(), %error, "scratch cleanup failed");
    }
    let report = result?;

    let path = write_disk_report(&output, &report)?;
    println!(
        "disk write={:.2}MB/s read={:.2}MB/s create_ops={:.2}/s delete_ops={:.2}/s",
        report.write_mb_s, report.read_mb_s, report.create_ops_s, report.delete_ops_s
    );
    println!("report: {}", path.display());
    Ok(())
}

fn measure(scratch: &Path, base: &Path) -> Result<DiskReport> {
    let blob = scratch.join("blob.bin");
    let block = vec![0xABu8; BLOCK_SIZE];

    let started = Instant::now();
    {
        let mut file = File::create(&blob).context("failed to create blob file")?;
        for _ in 0..BLOB_MB {
            file.write_all(&block)?;
        }
        file.flush()?;
        file.sync_all()?;
    }
    let write_secs = elapsed_secs(started);

    let started = Instant::now();
    {
        let mut file = File::open(&blob).context("failed to reopen blob file")?;
        let mut buffer = vec![0u8; BLOCK_SIZE];
        while file.read(&mut buffer)? > 0 {}
    }
    let read_secs = elapsed_secs(started);

    let tiny = vec![0x61u8; CHURN_FILE_SIZE];
    let started = Instant::now();
    for i in 0..CHURN_FILES {
        let mut file = File::create(scratch.join(format!("churn_{i}.tmp")))?;
        file.write_all(&tiny)?;
    }
    let create_secs = elapsed_secs(started);

    let started = Instant::now();
    for i in 0..CHURN_FILES {
        fs::remove_file(scratch.join(format!("churn_{i}.tmp")))?;
    }
    let delete_secs = elapsed_secs(started);

    Ok(DiskReport {
        mode: "disk",
        path: base.display().to_string(),
        write_mb_s: BLOB_MB as f64 / write_secs,
        read_mb_s: BLOB_MB as f64 / read_secs,
        create_ops_s: CHURN_FILES as f64 / create_secs,
        delete_ops_s: CHURN_FILES as f64 / delete_secs,
        files: CHURN_FILES,
        total_mb: BLOB_MB,
    })
}

/// Elapsed seconds, floored so rates stay finite on very fast disks.
fn elapsed_secs(started: Instant) -> f64 {
    started.elapsed().as_secs_f64().max(0.001)
}
