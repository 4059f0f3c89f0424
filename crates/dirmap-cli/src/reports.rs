//! Report writers: text directory maps and JSON records.
//!
//! The output location is passed in explicitly - there is no process-wide
//! output state. Filenames are timestamped so repeated runs never clobber
//! each other.

use anyhow::{Context, Result};
use chrono::Local;
use clap::ValueEnum;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use dirmap_core::automation::HistoryEntry;
use dirmap_core::host::HostInfo;
use dirmap_core::scan::{CrawlOutcome, ResultMap, RunStats};

/// Which report files a command writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportFormat {
    /// Text map only.
    Text,
    /// JSON record only.
    Json,
    /// Both.
    #[default]
    Both,
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
            Self::Both => write!(f, "both"),
        }
    }
}

impl ReportFormat {
    fn text(self) -> bool {
        matches!(self, Self::Text | Self::Both)
    }

    fn json(self) -> bool {
        matches!(self, Self::Json | Self::Both)
    }
}

/// Where and in which formats reports get written.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub format: ReportFormat,
}

impl OutputConfig {
    pub fn new(dir: &Path, format: ReportFormat) -> Self {
        Self {
            dir: dir.to_path_buf(),
            format,
        }
    }

    /// Create the output directory if needed.
    pub fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create output directory {}", self.dir.display()))
    }

    /// Timestamped report path: `dirmap_<mode>_<ts>.<ext>`.
    fn report_path(&self, mode: &str, ext: &str) -> PathBuf {
        let ts = Local::now().format("%Y-%m-%d_%H-%M-%S");
        self.dir.join(format!("dirmap_{mode}_{ts}.{ext}"))
    }
}

/// Host facts as serialized into every JSON report.
#[derive(Debug, Clone, Serialize)]
pub struct HostRecord {
    pub os: &'static str,
    pub arch: &'static str,
    pub cores: usize,
}

impl From<&HostInfo> for HostRecord {
    fn from(host: &HostInfo) -> Self {
        Self {
            os: host.os,
            arch: host.arch,
            cores: host.cores,
        }
    }
}

/// One crawl's stats as serialized into JSON reports.
#[derive(Debug, Clone, Serialize)]
pub struct RunStatsRecord {
    pub root: String,
    pub workers: usize,
    pub elapsed_ms: u64,
    pub folders: u64,
    pub files: u64,
    pub max_depth: u64,
    pub files_per_sec: f64,
    pub score: f64,
    pub permission_denied: u64,
    pub other_errors: u64,
}

impl From<&RunStats> for RunStatsRecord {
    fn from(stats: &RunStats) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        let elapsed_ms = stats.elapsed.as_millis() as u64;
        Self {
            root: stats.root.display().to_string(),
            workers: stats.workers,
            elapsed_ms,
            folders: stats.folders,
            files: stats.files,
            max_depth: stats.max_depth,
            files_per_sec: stats.files_per_sec,
            score: stats.score,
            permission_denied: stats.permission_denied,
            other_errors: stats.other_errors,
        }
    }
}

#[derive(Serialize)]
struct ScanReport {
    mode: &'static str,
    host: HostRecord,
    stats: RunStatsRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<String>,
}

#[derive(Serialize)]
struct BenchReport {
    mode: &'static str,
    host: HostRecord,
    root: String,
    iterations: usize,
    results: Vec<RunStatsRecord>,
}

/// Disk micro-benchmark metrics.
#[derive(Debug, Clone, Serialize)]
pub struct DiskReport {
    pub mode: &'static str,
    pub path: String,
    pub write_mb_s: f64,
    pub read_mb_s: f64,
    pub create_ops_s: f64,
    pub delete_ops_s: f64,
    pub files: usize,
    pub total_mb: usize,
}

#[derive(Serialize)]
struct AutoReport {
    mode: &'static str,
    host: HostRecord,
    root: String,
    history: Vec<HistoryRecord>,
}

#[derive(Serialize)]
struct HistoryRecord {
    timestamp: String,
    mode: String,
    stats: RunStatsRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<String>,
}

impl From<&HistoryEntry> for HistoryRecord {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            timestamp: entry.timestamp.to_rfc3339(),
            mode: entry.mode.to_string(),
            stats: RunStatsRecord::from(&entry.stats),
            report: entry
                .report
                .as_ref()
                .map(|path| path.display().to_string()),
        }
    }
}

/// Write the scan reports per the configured format.
///
/// Returns the paths written, text map first.
pub fn write_scan_reports(output: &OutputConfig, outcome: &CrawlOutcome) -> Result<Vec<PathBuf>> {
    output.ensure_dir()?;
    let mut written = Vec::new();

    let text_path = if output.format.text() {
        let path = output.report_path("map", "txt");
        write_map_text(&path, &outcome.map)
            .with_context(|| format!("failed to write map report {}", path.display()))?;
        written.push(path.clone());
        Some(path)
    } else {
        None
    };

    if output.format.json() {
        let path = output.report_path("map", "json");
        let report = ScanReport {
            mode: "map",
            host: HostRecord::from(&HostInfo::detect()),
            stats: RunStatsRecord::from(&outcome.stats),
            report: text_path.map(|p| p.display().to_string()),
        };
        write_json(&path, &report)?;
        written.push(path);
    }

    Ok(written)
}

/// Write the benchmark ranking reports per the configured format.
pub fn write_bench_reports(
    output: &OutputConfig,
    root: &Path,
    iterations: usize,
    ranked: &[RunStats],
) -> Result<Vec<PathBuf>> {
    output.ensure_dir()?;
    let mut written = Vec::new();

    if output.format.text() {
        let path = output.report_path("bench", "txt");
        write_bench_text(&path, root, iterations, ranked)
            .with_context(|| format!("failed to write bench report {}", path.display()))?;
        written.push(path);
    }

    if output.format.json() {
        let path = output.report_path("bench", "json");
        let report = BenchReport {
            mode: "bench",
            host: HostRecord::from(&HostInfo::detect()),
            root: root.display().to_string(),
            iterations,
            results: ranked.iter().map(RunStatsRecord::from).collect(),
        };
        write_json(&path, &report)?;
        written.push(path);
    }

    Ok(written)
}

/// Write the disk micro-benchmark record (always JSON).
pub fn write_disk_report(output: &OutputConfig, report: &DiskReport) -> Result<PathBuf> {
    output.ensure_dir()?;
    let path = output.report_path("disk", "json");
    write_json(&path, report)?;
    Ok(path)
}

/// Write the automation history record (always JSON).
pub fn write_auto_report(
    output: &OutputConfig,
    root: &Path,
    history: &[HistoryEntry],
) -> Result<PathBuf> {
    output.ensure_dir()?;
    let path = output.report_path("auto", "json");
    let report = AutoReport {
        mode: "auto",
        host: HostRecord::from(&HostInfo::detect()),
        root: root.display().to_string(),
        history: history.iter().map(HistoryRecord::from).collect(),
    };
    write_json(&path, &report)?;
    Ok(path)
}

/// Text map format: directory line, four-space indented files, blank
/// separator.
fn write_map_text(path: &Path, map: &ResultMap) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    for (dir, files) in map {
        writeln!(writer, "{}:", dir.display())?;
        for file in files {
            writeln!(writer, "    {}", file.display())?;
        }
        writeln!(writer)?;
    }
    writer.flush()
}

/// Ranked benchmark lines, fastest first.
fn write_bench_text(
    path: &Path,
    root: &Path,
    iterations: usize,
    ranked: &[RunStats],
) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writeln!(writer, "root={}", root.display())?;
    writeln!(writer, "iterations={iterations}")?;
    for (rank, stats) in ranked.iter().enumerate() {
        writeln!(
            writer,
            "{}. workers={} avg_ms={} files={} folders={} files_per_sec={:.2} depth={} score={:.2} denied={} errors={}",
            rank + 1,
            stats.workers,
            stats.elapsed.as_millis(),
            stats.files,
            stats.folders,
            stats.files_per_sec,
            stats.max_depth,
            stats.score,
            stats.permission_denied,
            stats.other_errors,
        )?;
    }
    writer.flush()
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize report")?;
    fs::write(path, json)
        .with_context(|| format!("failed to write JSON report {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dirmap_core::scan::{crawl, ScanOptions};
    use std::fs::File as StdFile;

    fn sample_outcome(dir: &Path) -> CrawlOutcome {
        StdFile::create(dir.join("one.txt")).unwrap();
        fs::create_dir(dir.join("sub")).unwrap();
        StdFile::create(dir.join("sub").join("two.txt")).unwrap();
        crawl(dir, &ScanOptions::new(2)).unwrap()
    }

    #[test]
    fn test_scan_reports_both_formats() {
        let tree = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let outcome = sample_outcome(tree.path());

        let output = OutputConfig::new(out.path(), ReportFormat::Both);
        let written = write_scan_reports(&output, &outcome).unwrap();
        assert_eq!(written.len(), 2);
        assert!(written[0].extension().is_some_and(|e| e == "txt"));
        assert!(written[1].extension().is_some_and(|e| e == "json"));

        let text = fs::read_to_string(&written[0]).unwrap();
        assert!(text.contains(&format!("{}:", tree.path().display())));
        assert!(text.contains("    "));

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&written[1]).unwrap()).unwrap();
        assert_eq!(json["mode"], "map");
        assert_eq!(json["stats"]["files"], 2);
        assert_eq!(json["stats"]["folders"], 1);
        assert!(json["report"].is_string());
    }

    #[test]
    fn test_scan_report_json_only() {
        let tree = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let outcome = sample_outcome(tree.path());

        let output = OutputConfig::new(out.path(), ReportFormat::Json);
        let written = write_scan_reports(&output, &outcome).unwrap();
        assert_eq!(written.len(), 1);

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&written[0]).unwrap()).unwrap();
        assert!(json.get("report").is_none());
    }

    #[test]
    fn test_bench_text_lines_are_ranked() {
        let tree = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let outcome = sample_outcome(tree.path());

        let output = OutputConfig::new(out.path(), ReportFormat::Text);
        let written =
            write_bench_reports(&output, tree.path(), 2, &[outcome.stats.clone()]).unwrap();
        assert_eq!(written.len(), 1);

        let text = fs::read_to_string(&written[0]).unwrap();
        assert!(text.starts_with(&format!("root={}\n", tree.path().display())));
        assert!(text.contains("iterations=2"));
        assert!(text.contains("1. workers=2"));
    }
}
