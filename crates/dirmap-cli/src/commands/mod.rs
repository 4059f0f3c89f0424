//! Subcommand implementations.

pub mod auto;
pub mod bench;
pub mod disk;
pub mod scan;
pub mod workers;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Resolve a user-supplied root to an absolute path without following
/// symlinks.
pub fn absolute_root(root: &Path) -> Result<PathBuf> {
    std::path::absolute(root)
        .with_context(|| format!("failed to resolve scan root {}", root.display()))
}

/// Convert an optional millisecond flag into a throttle duration.
pub fn throttle_from_ms(throttle_ms: Option<u64>) -> Option<Duration> {
    throttle_ms.filter(|&ms| ms > 0).map(Duration::from_millis)
}
