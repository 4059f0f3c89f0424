//! Integration tests for the concurrent crawler.

use dirmap_core::scan::{crawl, ScanOptions};
use dirmap_core::ScanError;
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

/// Build the worked example from the design discussion: two files at the
/// root and three subdirectories at depth 1, one holding ten files and two
/// empty.
fn example_tree() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    File::create(dir.path().join("root_a.txt")).unwrap();
    File::create(dir.path().join("root_b.txt")).unwrap();

    let full = dir.path().join("full");
    fs::create_dir(&full).unwrap();
    for i in 0..10 {
        File::create(full.join(format!("f{i}.dat"))).unwrap();
    }
    fs::create_dir(dir.path().join("empty_one")).unwrap();
    fs::create_dir(dir.path().join("empty_two")).unwrap();
    dir
}

/// A deeper, wider tree for traversal tests: depth 3, three dirs and two
/// files per level.
fn nested_tree() -> (TempDir, BTreeSet<PathBuf>) {
    let dir = tempfile::tempdir().unwrap();
    let mut dirs = BTreeSet::new();
    dirs.insert(dir.path().to_path_buf());
    build_level(dir.path(), 0, &mut dirs);
    (dir, dirs)
}

fn build_level(parent: &Path, depth: usize, dirs: &mut BTreeSet<PathBuf>) {
    if depth >= 3 {
        return;
    }
    for i in 0..2 {
        File::create(parent.join(format!("file_{depth}_{i}.txt"))).unwrap();
    }
    for i in 0..3 {
        let sub = parent.join(format!("dir_{depth}_{i}"));
        fs::create_dir(&sub).unwrap();
        dirs.insert(sub.clone());
        build_level(&sub, depth + 1, dirs);
    }
}

#[test]
fn test_example_tree_counts() {
    let tree = example_tree();
    let outcome = crawl(tree.path(), &ScanOptions::new(4)).unwrap();

    assert_eq!(outcome.stats.folders, 3);
    assert_eq!(outcome.stats.files, 12);
    assert_eq!(outcome.stats.max_depth, 1);
    assert_eq!(outcome.stats.permission_denied, 0);
    assert_eq!(outcome.stats.other_errors, 0);
    assert_eq!(outcome.map.len(), 4);

    assert_eq!(outcome.map[tree.path()].len(), 2);
    assert_eq!(outcome.map[&tree.path().join("full")].len(), 10);
    assert!(outcome.map[&tree.path().join("empty_one")].is_empty());
    assert!(outcome.map[&tree.path().join("empty_two")].is_empty());
}

#[test]
fn test_map_keys_equal_reachable_directories() {
    let (tree, expected_dirs) = nested_tree();
    let outcome = crawl(tree.path(), &ScanOptions::new(8)).unwrap();

    let keys: BTreeSet<PathBuf> = outcome.map.keys().cloned().collect();
    assert_eq!(keys, expected_dirs);
    // Every directory was discovered exactly once: the folder counter
    // matches the key count minus the root.
    assert_eq!(outcome.stats.folders as usize, expected_dirs.len() - 1);
    assert_eq!(outcome.stats.max_depth, 3);
}

#[test]
fn test_file_list_length_matches_directory_contents() {
    let (tree, _) = nested_tree();
    let outcome = crawl(tree.path(), &ScanOptions::new(2)).unwrap();

    for (dir, files) in &outcome.map {
        let on_disk = fs::read_dir(dir)
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
            .count();
        assert_eq!(files.len(), on_disk, "mismatch under {}", dir.display());
    }
}

#[test]
fn test_idempotent_across_worker_counts() {
    let (tree, _) = nested_tree();
    let baseline = crawl(tree.path(), &ScanOptions::new(1)).unwrap();

    for workers in [2, 4, 16] {
        let outcome = crawl(tree.path(), &ScanOptions::new(workers)).unwrap();
        let mut sorted = outcome.map.clone();
        for files in sorted.values_mut() {
            files.sort();
        }
        let mut baseline_sorted = baseline.map.clone();
        for files in baseline_sorted.values_mut() {
            files.sort();
        }
        assert_eq!(sorted, baseline_sorted, "workers={workers}");
        assert_eq!(outcome.stats.folders, baseline.stats.folders);
        assert_eq!(outcome.stats.files, baseline.stats.files);
        assert_eq!(outcome.stats.max_depth, baseline.stats.max_depth);
    }
}

#[test]
fn test_throttle_changes_timing_only() {
    let tree = example_tree();
    let plain = crawl(tree.path(), &ScanOptions::new(2)).unwrap();
    let throttled = crawl(
        tree.path(),
        &ScanOptions::new(2).with_throttle(Some(Duration::from_millis(1))),
    )
    .unwrap();

    assert_eq!(plain.map, throttled.map);
    assert_eq!(plain.stats.files, throttled.stats.files);
    assert_eq!(plain.stats.folders, throttled.stats.folders);
}

#[test]
fn test_missing_root_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("not_there");
    let error = crawl(&missing, &ScanOptions::new(4)).unwrap_err();
    assert!(matches!(error, ScanError::RootUnavailable { .. }));
}

#[test]
fn test_file_root_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("plain.txt");
    File::create(&file).unwrap();
    let error = crawl(&file, &ScanOptions::new(4)).unwrap_err();
    assert!(matches!(error, ScanError::RootNotADirectory { .. }));
}

#[test]
fn test_empty_root() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = crawl(dir.path(), &ScanOptions::new(4)).unwrap();
    assert_eq!(outcome.map.len(), 1);
    assert!(outcome.map[dir.path()].is_empty());
    assert_eq!(outcome.stats.folders, 0);
    assert_eq!(outcome.stats.files, 0);
    assert_eq!(outcome.stats.max_depth, 0);
}

#[cfg(unix)]
#[test]
fn test_symlink_cycle_terminates() {
    let dir = tempfile::tempdir().unwrap();
    let sub = dir.path().join("sub");
    fs::create_dir(&sub).unwrap();
    File::create(sub.join("inner.txt")).unwrap();
    // Link back up to the root: following it would loop forever.
    std::os::unix::fs::symlink(dir.path(), sub.join("loop")).unwrap();

    let outcome = crawl(dir.path(), &ScanOptions::new(4)).unwrap();
    assert_eq!(outcome.map.len(), 2);
    assert!(!outcome.map.contains_key(&sub.join("loop")));
    assert_eq!(outcome.stats.files, 1);
}

#[cfg(unix)]
#[test]
fn test_unreadable_root_counts_denial() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let locked = dir.path().join("locked");
    fs::create_dir(&locked).unwrap();
    File::create(locked.join("hidden.txt")).unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Under uid 0 the permission bits are not enforced; nothing to test.
    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let outcome = crawl(&locked, &ScanOptions::new(4)).unwrap();
    assert_eq!(outcome.stats.permission_denied, 1);
    assert_eq!(outcome.stats.folders, 0);
    assert_eq!(outcome.stats.files, 0);
    assert_eq!(outcome.map.len(), 1);
    assert!(outcome.map[&locked].is_empty());

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
}

#[test]
fn test_single_worker_handles_wide_tree() {
    // Wider than the admission floor of 8, to exercise queue backlog with
    // the smallest possible pool.
    let dir = tempfile::tempdir().unwrap();
    for i in 0..40 {
        let sub = dir.path().join(format!("wide_{i:02}"));
        fs::create_dir(&sub).unwrap();
        File::create(sub.join("leaf.txt")).unwrap();
    }

    let outcome = crawl(dir.path(), &ScanOptions::new(1)).unwrap();
    assert_eq!(outcome.stats.folders, 40);
    assert_eq!(outcome.stats.files, 40);
    assert_eq!(outcome.map.len(), 41);
}
