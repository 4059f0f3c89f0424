//! Admission-controlled BFS scheduler.
//!
//! A fixed pool of worker threads executes directory listings; the
//! scheduler thread is the only one touching the queue, the result map and
//! the counters. Coordination is two crossbeam channels:
//!
//! ```text
//! Scheduler thread                      Listing workers
//! ┌──────────────────────┐              ┌──────────────────┐
//! │ pop queue            │──jobs──────▶ │ list_directory   │
//! │ reserve map key      │              │                  │
//! │ recv() completions   │◀─listings─── │ (no shared state)│
//! │ merge + enqueue subs │              └──────────────────┘
//! └──────────────────────┘
//! ```
//!
//! Admission keeps at most `max(8, workers * 4)` listings outstanding, so
//! the pool stays saturated whenever queued work exists while outstanding
//! filesystem operations stay capped regardless of tree width. The blocking
//! `recv()` is the wait-for-any primitive - the scheduler never polls.

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::{debug, warn};

use super::lister::{list_directory, DirListing};
use super::{CrawlOutcome, ResultMap, RunStats, ScanOptions};
use crate::error::ScanError;

/// Floor for the in-flight limit, so tiny pools still pipeline listings.
const MIN_IN_FLIGHT: usize = 8;

/// Outstanding listings allowed per worker.
const IN_FLIGHT_PER_WORKER: usize = 4;

/// In-flight admission limit for a pool of the given size.
pub fn admission_limit(workers: usize) -> usize {
    MIN_IN_FLIGHT.max(workers * IN_FLIGHT_PER_WORKER)
}

/// One dispatched listing.
struct ListJob {
    path: PathBuf,
    depth: u64,
}

/// One completed listing.
struct ListDone {
    path: PathBuf,
    depth: u64,
    listing: DirListing,
}

/// Running counters owned by the scheduler thread.
#[derive(Default)]
struct Counters {
    folders: u64,
    files: u64,
    max_depth: u64,
    permission_denied: u64,
    other_errors: u64,
}

/// Crawl the tree under `root` with a bounded worker pool.
///
/// The only fatal condition is a root that does not exist or is not a
/// directory, checked before any work is scheduled. Everything else -
/// unreadable directories, entries vanishing mid-scan, even worker death -
/// is absorbed into the error counters and the crawl runs to completion.
pub fn crawl(root: &Path, options: &ScanOptions) -> Result<CrawlOutcome, ScanError> {
    let metadata = fs::symlink_metadata(root).map_err(|source| ScanError::RootUnavailable {
        path: root.to_path_buf(),
        source,
    })?;
    if !metadata.is_dir() {
        return Err(ScanError::RootNotADirectory {
            path: root.to_path_buf(),
        });
    }

    let workers = options.workers.max(1);
    let limit = admission_limit(workers);
    debug!(
        root = %root.display(),
        workers,
        in_flight_limit = limit,
        "starting crawl"
    );

    let (job_tx, job_rx) = crossbeam_channel::unbounded::<ListJob>();
    let (done_tx, done_rx) = crossbeam_channel::unbounded::<ListDone>();
    let pool = spawn_workers(workers, &job_rx, &done_tx);
    // The scheduler holds only the receiving side; workers own the clones.
    drop(job_rx);
    drop(done_tx);

    let started = Instant::now();
    let mut queue: VecDeque<(PathBuf, u64)> = VecDeque::new();
    let mut map = ResultMap::new();
    let mut counters = Counters::default();
    let mut in_flight = 0usize;

    // The root is reserved up front, like every directory at discovery.
    map.insert(root.to_path_buf(), Vec::new());
    queue.push_back((root.to_path_buf(), 0));

    loop {
        // Admission: keep the pool fed while staying under the limit.
        while in_flight < limit {
            let Some((path, depth)) = queue.pop_front() else {
                break;
            };
            if job_tx.send(ListJob { path, depth }).is_err() {
                // Pool is gone; the subtree stays unexpanded.
                counters.other_errors += 1;
                continue;
            }
            in_flight += 1;
            if let Some(delay) = options.throttle {
                thread::sleep(delay);
            }
        }

        if in_flight == 0 && queue.is_empty() {
            break;
        }

        // Wait-for-any: block until at least one listing completes, then
        // drain whatever else has already arrived.
        match done_rx.recv() {
            Ok(done) => {
                in_flight -= 1;
                process_completion(done, &mut queue, &mut map, &mut counters);
                loop {
                    match done_rx.try_recv() {
                        Ok(done) => {
                            in_flight -= 1;
                            process_completion(done, &mut queue, &mut map, &mut counters);
                        }
                        Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
                    }
                }
            }
            Err(_) => {
                // All workers died with listings outstanding. Count the
                // losses and terminate with what we have.
                warn!(in_flight, "listing workers disconnected mid-crawl");
                counters.other_errors += in_flight as u64;
                in_flight = 0;
            }
        }
    }

    let elapsed = started.elapsed();
    drop(job_tx);
    for handle in pool {
        let _ = handle.join();
    }

    let files_per_sec = if elapsed.as_secs_f64() > 0.0 {
        counters.files as f64 / elapsed.as_secs_f64()
    } else {
        counters.files as f64
    };
    let score = (options.score)(
        files_per_sec,
        counters.max_depth,
        counters.permission_denied,
        counters.other_errors,
    );

    let stats = RunStats {
        root: root.to_path_buf(),
        workers,
        elapsed,
        folders: counters.folders,
        files: counters.files,
        max_depth: counters.max_depth,
        files_per_sec,
        permission_denied: counters.permission_denied,
        other_errors: counters.other_errors,
        score,
    };
    debug!(
        folders = stats.folders,
        files = stats.files,
        max_depth = stats.max_depth,
        elapsed_ms = elapsed.as_millis() as u64,
        "crawl finished"
    );

    Ok(CrawlOutcome { map, stats })
}

/// Merge one completed listing and enqueue its newly discovered subtrees.
fn process_completion(
    done: ListDone,
    queue: &mut VecDeque<(PathBuf, u64)>,
    map: &mut ResultMap,
    counters: &mut Counters,
) {
    counters.max_depth = counters.max_depth.max(done.depth);
    counters.files += done.listing.files.len() as u64;
    counters.permission_denied += done.listing.permission_denied;
    counters.other_errors += done.listing.other_errors;

    if let Some(slot) = map.get_mut(&done.path) {
        slot.extend(done.listing.files);
    }

    for subdir in done.listing.subdirs {
        // Reserve at discovery; a path reached twice is never re-scheduled.
        if !map.contains_key(&subdir) {
            map.insert(subdir.clone(), Vec::new());
            queue.push_back((subdir, done.depth + 1));
            counters.folders += 1;
        }
    }
}

/// Spawn the listing pool. Workers drain the job channel until it closes,
/// touching no state beyond their own job.
fn spawn_workers(
    workers: usize,
    job_rx: &Receiver<ListJob>,
    done_tx: &Sender<ListDone>,
) -> Vec<JoinHandle<()>> {
    (0..workers)
        .map(|worker_id| {
            let job_rx = job_rx.clone();
            let done_tx = done_tx.clone();
            thread::Builder::new()
                .name(format!("dirmap-worker-{worker_id}"))
                .spawn(move || {
                    while let Ok(job) = job_rx.recv() {
                        let listing = list_directory(&job.path);
                        let done = ListDone {
                            path: job.path,
                            depth: job.depth,
                            listing,
                        };
                        if done_tx.send(done).is_err() {
                            break;
                        }
                    }
                })
                .expect("failed to spawn listing worker thread")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admission_limit_floors_at_eight() {
        assert_eq!(admission_limit(1), 8);
        assert_eq!(admission_limit(2), 8);
        assert_eq!(admission_limit(3), 12);
        assert_eq!(admission_limit(16), 64);
    }
}
