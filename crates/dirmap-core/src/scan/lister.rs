//! Single-directory listing.
//!
//! The leaf operation of the crawler: list one directory's immediate
//! children, classified by type, with access failures counted rather than
//! raised. Stateless and safe to call concurrently for disjoint paths.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Immediate children of one directory, plus access-failure counters.
#[derive(Debug, Default, Clone)]
pub struct DirListing {
    /// Immediate subdirectories, in directory order.
    pub subdirs: Vec<PathBuf>,
    /// Immediate regular files, in directory order.
    pub files: Vec<PathBuf>,
    /// Permission failures (whole-directory or per-entry).
    pub permission_denied: u64,
    /// Any other I/O failure (e.g. entry removed mid-listing).
    pub other_errors: u64,
}

impl DirListing {
    fn count_error(&mut self, error: &std::io::Error) {
        if error.kind() == ErrorKind::PermissionDenied {
            self.permission_denied += 1;
        } else {
            self.other_errors += 1;
        }
    }
}

/// List one directory's immediate children.
///
/// Entry types come from `DirEntry::file_type`, which does not follow
/// symlinks - a link to a directory is neither a file nor a subdirectory
/// here, which is what keeps the traversal acyclic. Failures never
/// propagate; an unreadable directory simply yields an empty listing with
/// the appropriate counter bumped.
pub fn list_directory(path: &Path) -> DirListing {
    let mut listing = DirListing::default();

    let entries = match fs::read_dir(path) {
        Ok(entries) => entries,
        Err(error) => {
            listing.count_error(&error);
            return listing;
        }
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                listing.count_error(&error);
                continue;
            }
        };
        match entry.file_type() {
            Ok(file_type) if file_type.is_dir() => listing.subdirs.push(entry.path()),
            Ok(file_type) if file_type.is_file() => listing.files.push(entry.path()),
            // Symlinks and special files are intentionally not recorded.
            Ok(_) => {}
            Err(error) => listing.count_error(&error),
        }
    }

    listing
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn test_lists_files_and_subdirs() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("a.txt")).unwrap();
        File::create(dir.path().join("b.txt")).unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();

        let listing = list_directory(dir.path());
        assert_eq!(listing.files.len(), 2);
        assert_eq!(listing.subdirs.len(), 1);
        assert_eq!(listing.permission_denied, 0);
        assert_eq!(listing.other_errors, 0);
    }

    #[test]
    fn test_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let listing = list_directory(dir.path());
        assert!(listing.files.is_empty());
        assert!(listing.subdirs.is_empty());
    }

    #[test]
    fn test_missing_directory_counts_one_error() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("nope");
        let listing = list_directory(&gone);
        assert_eq!(listing.other_errors, 1);
        assert!(listing.files.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_are_not_classified() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("real")).unwrap();
        File::create(dir.path().join("file.txt")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("link_dir")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("file.txt"), dir.path().join("link_file"))
            .unwrap();

        let listing = list_directory(dir.path());
        assert_eq!(listing.subdirs, vec![dir.path().join("real")]);
        assert_eq!(listing.files, vec![dir.path().join("file.txt")]);
    }
}
