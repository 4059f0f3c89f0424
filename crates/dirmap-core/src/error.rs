//! Error types for the crawler core.
//!
//! Per-directory access failures are not errors: they are counted in
//! [`RunStats`](crate::scan::RunStats) and never abort a crawl. The only
//! fatal condition is a scan root that cannot be used at all, detected
//! before any work is scheduled.

use std::path::PathBuf;

/// Fatal errors raised before a crawl schedules any work.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The scan root does not exist or cannot be inspected.
    #[error("scan root unavailable: {path}")]
    RootUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The scan root exists but is not a directory.
    #[error("scan root is not a directory: {path}")]
    RootNotADirectory { path: PathBuf },
}
