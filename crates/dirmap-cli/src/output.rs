//! Terminal output helpers.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;

use dirmap_core::scan::RunStats;

/// Create a styled table for output.
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS);
    table
}

/// Render the benchmark ranking, fastest candidate first.
pub fn render_ranking_table(ranked: &[RunStats]) -> Table {
    let mut table = create_table();
    table.set_header(vec![
        "#", "workers", "avg ms", "files", "folders", "depth", "files/s", "score", "denied",
        "errors",
    ]);
    for (rank, stats) in ranked.iter().enumerate() {
        table.add_row(vec![
            (rank + 1).to_string(),
            stats.workers.to_string(),
            stats.elapsed.as_millis().to_string(),
            stats.files.to_string(),
            stats.folders.to_string(),
            stats.max_depth.to_string(),
            format!("{:.2}", stats.files_per_sec),
            format!("{:.2}", stats.score),
            stats.permission_denied.to_string(),
            stats.other_errors.to_string(),
        ]);
    }
    table
}

/// One-line crawl summary.
pub fn print_scan_summary(stats: &RunStats) {
    println!(
        "scan done root={} workers={} ms={} folders={} files={} depth={} files/s={:.2} score={:.2} denied={} errors={}",
        stats.root.display(),
        stats.workers,
        stats.elapsed.as_millis(),
        stats.folders,
        stats.files,
        stats.max_depth,
        stats.files_per_sec,
        stats.score,
        stats.permission_denied,
        stats.other_errors,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    fn sample_stats() -> RunStats {
        RunStats {
            root: PathBuf::from("/tmp/sample"),
            workers: 4,
            elapsed: Duration::from_millis(120),
            folders: 3,
            files: 12,
            max_depth: 1,
            files_per_sec: 100.0,
            score: 100.0,
            permission_denied: 0,
            other_errors: 0,
        }
    }

    #[test]
    fn test_ranking_table_has_row_per_candidate() {
        let table = render_ranking_table(&[sample_stats(), sample_stats()]);
        assert_eq!(table.row_iter().count(), 2);
    }
}
