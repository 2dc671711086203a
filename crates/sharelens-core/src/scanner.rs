//! Directory scanning backends.
//!
//! This module defines the abstract interface for listing a single
//! directory. The walker and the listing endpoint interact only through the
//! [`DirectoryScanner`] trait, which keeps the recursion logic independent of
//! the filesystem and lets tests substitute synthetic trees.
//!
//! ## Implementing a New Scanner
//!
//! 1. Implement `read_dir` to return a lazy iterator over one directory
//! 2. Implement `dir_identity` so walks can detect revisited directories
//! 3. Never recurse: recursion belongs to the walker

use crate::error::{CoreError, Result};
use crate::types::{DirIdentity, DirectoryListing, Entry, FileRecord, FolderRecord};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

/// Lazy sequence of the entries of one directory.
pub type Entries = Box<dyn Iterator<Item = Entry> + Send>;

/// Lists the immediate contents of one directory.
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync`: one scanner is shared by every
/// concurrent search in the process.
///
/// ## Ordering
///
/// Entries come back in whatever order the filesystem produces them. Callers
/// that need a stable order must sort.
pub trait DirectoryScanner: Send + Sync {
    /// Open `path` and return its entries.
    ///
    /// Fails with [`CoreError::NotReadable`] if the directory cannot be
    /// opened. Entries that cannot be stat-ed are left out of the sequence.
    fn read_dir(&self, path: &Path) -> Result<Entries>;

    /// Stable identity of the directory at `path`, if one can be determined.
    fn dir_identity(&self, path: &Path) -> Option<DirIdentity>;

    /// Get the scanner name (e.g., "local")
    fn name(&self) -> &'static str;
}

/// List one directory completely.
pub fn scan(scanner: &dyn DirectoryScanner, path: &Path) -> Result<DirectoryListing> {
    let mut listing = DirectoryListing::default();
    for entry in scanner.read_dir(path)? {
        match entry {
            Entry::File(file) => listing.files.push(file),
            Entry::Folder(folder) => listing.folders.push(folder),
        }
    }
    debug!(
        path = %path.display(),
        files = listing.files.len(),
        folders = listing.folders.len(),
        "Scanned directory"
    );
    Ok(listing)
}

/// Scanner over the local (or mounted network) filesystem.
///
/// Entry metadata is read with `fs::metadata`, which follows symbolic links:
/// a link to a directory is reported as a folder, and a dangling link is
/// skipped because it cannot be stat-ed.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalScanner;

impl LocalScanner {
    pub fn new() -> Self {
        LocalScanner
    }
}

impl DirectoryScanner for LocalScanner {
    fn read_dir(&self, path: &Path) -> Result<Entries> {
        let read_dir = fs::read_dir(path).map_err(|e| CoreError::not_readable(path, &e))?;
        let parent = path.to_path_buf();

        Ok(Box::new(read_dir.filter_map(move |dirent| {
            let dirent = match dirent {
                Ok(dirent) => dirent,
                Err(e) => {
                    debug!(dir = %parent.display(), error = %e, "Skipping unreadable entry");
                    return None;
                }
            };
            stat_entry(&parent, dirent.file_name().to_string_lossy().into_owned())
        })))
    }

    fn dir_identity(&self, path: &Path) -> Option<DirIdentity> {
        local_identity(path)
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

fn stat_entry(parent: &Path, name: String) -> Option<Entry> {
    let full_path: PathBuf = parent.join(&name);
    let metadata = match fs::metadata(&full_path) {
        Ok(metadata) => metadata,
        Err(e) => {
            debug!(path = %full_path.display(), error = %e, "Skipping entry that cannot be stat-ed");
            return None;
        }
    };

    if metadata.is_dir() {
        Some(Entry::Folder(FolderRecord::new(parent, name)))
    } else {
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        Some(Entry::File(FileRecord::new(
            parent,
            name,
            metadata.len(),
            DateTime::<Utc>::from(modified),
        )))
    }
}

#[cfg(unix)]
fn local_identity(path: &Path) -> Option<DirIdentity> {
    use std::os::unix::fs::MetadataExt;

    fs::metadata(path).ok().map(|m| DirIdentity::Inode {
        dev: m.dev(),
        ino: m.ino(),
    })
}

#[cfg(not(unix))]
fn local_identity(path: &Path) -> Option<DirIdentity> {
    fs::canonicalize(path).ok().map(DirIdentity::Canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn sorted_names(listing: &DirectoryListing) -> (Vec<String>, Vec<String>) {
        let mut files: Vec<_> = listing.files.iter().map(|f| f.name.clone()).collect();
        let mut folders: Vec<_> = listing.folders.iter().map(|f| f.name.clone()).collect();
        files.sort();
        folders.sort();
        (files, folders)
    }

    #[test]
    fn test_scan_lists_files_and_folders() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.txt"), b"abc").unwrap();
        fs::write(temp_dir.path().join("b.pdf"), b"").unwrap();
        fs::create_dir(temp_dir.path().join("sub")).unwrap();
        fs::write(temp_dir.path().join("sub").join("nested.txt"), b"x").unwrap();

        let listing = scan(&LocalScanner, temp_dir.path()).unwrap();
        let (files, folders) = sorted_names(&listing);

        assert_eq!(files, vec!["a.txt", "b.pdf"]);
        assert_eq!(folders, vec!["sub"]);

        let sub = &listing.folders[0];
        assert_eq!(
            sub.path,
            temp_dir.path().join("sub").to_string_lossy().into_owned()
        );
    }

    #[test]
    fn test_record_reports_size_and_mtime() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("known.bin");
        fs::write(&path, vec![7u8; 1234]).unwrap();

        let mtime = SystemTime::UNIX_EPOCH + Duration::from_secs(1_600_000_000);
        let file = fs::OpenOptions::new().write(true).open(&path).unwrap();
        file.set_modified(mtime).unwrap();
        drop(file);

        let listing = scan(&LocalScanner, temp_dir.path()).unwrap();
        let record = &listing.files[0];

        assert_eq!(record.size, 1234);
        let expected = DateTime::<Utc>::from(mtime);
        let drift = (record.modified - expected).num_milliseconds().abs();
        assert!(drift <= 2000, "mtime drifted by {drift}ms");
    }

    #[test]
    fn test_missing_directory_is_not_readable() {
        let temp_dir = TempDir::new().unwrap();
        let err = scan(&LocalScanner, &temp_dir.path().join("offline")).unwrap_err();
        assert!(matches!(err, CoreError::NotReadable { .. }));
    }

    #[test]
    fn test_file_path_is_not_readable() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("plain.txt");
        fs::write(&file, b"x").unwrap();

        let err = scan(&LocalScanner, &file).unwrap_err();
        assert!(matches!(err, CoreError::NotReadable { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_are_followed_and_dangling_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("target");
        fs::create_dir(&target).unwrap();
        std::os::unix::fs::symlink(&target, temp_dir.path().join("link")).unwrap();
        std::os::unix::fs::symlink(
            temp_dir.path().join("gone"),
            temp_dir.path().join("dangling"),
        )
        .unwrap();

        let listing = scan(&LocalScanner, temp_dir.path()).unwrap();
        let (files, folders) = sorted_names(&listing);

        assert!(files.is_empty());
        assert_eq!(folders, vec!["link", "target"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_identity_matches_through_symlink() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("target");
        fs::create_dir(&target).unwrap();
        let link = temp_dir.path().join("link");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let scanner = LocalScanner::new();
        assert_eq!(scanner.dir_identity(&target), scanner.dir_identity(&link));
        assert!(scanner.dir_identity(&temp_dir.path().join("missing")).is_none());
    }
}
