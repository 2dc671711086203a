//! Recursive tree walking.
//!
//! The [`Walker`] turns a [`DirectoryScanner`] into a depth-first, pull-based
//! stream of [`FileRecord`]s over an entire subtree.
//!
//! ## Memory
//!
//! The walker keeps one open entry iterator per directory on the current
//! path from the root, so frame state grows with the depth of the tree, never
//! with the number of files. Records are produced one at a time as the
//! consumer pulls them; nothing is collected ahead of the consumer.
//!
//! ## Failure Handling
//!
//! A directory that cannot be opened is logged at warn level and contributes
//! no records. The walk continues with its siblings, so one offline share or
//! one locked folder never hides the rest of the tree.
//!
//! ## Cycles
//!
//! Symbolic links are followed. Every directory's identity is recorded for
//! the duration of the walk and a directory seen twice is skipped, which both
//! terminates link cycles and keeps files reachable through two links from
//! being reported twice.

use crate::cancel::CancelToken;
use crate::error::{CoreError, Result};
use crate::scanner::{DirectoryScanner, Entries};
use crate::types::{DirIdentity, Entry, FileRecord};
use glob::{MatchOptions, Pattern};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Folder names that are never descended into.
#[derive(Debug, Clone, Default)]
pub struct NameFilter {
    patterns: Vec<Pattern>,
}

impl NameFilter {
    /// Compile glob patterns (matched case-insensitively against base names).
    pub fn new(patterns: &[String]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Pattern::new(p).map_err(|e| CoreError::ConfigError {
                    reason: format!("invalid exclude pattern {:?}: {}", p, e),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(NameFilter { patterns })
    }

    /// Check if a folder name is excluded.
    pub fn is_excluded(&self, name: &str) -> bool {
        let options = MatchOptions {
            case_sensitive: false,
            ..MatchOptions::new()
        };
        self.patterns
            .iter()
            .any(|p| p.matches_with(name, options))
    }
}

/// Counters for one walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// Files yielded so far
    pub files: u64,

    /// Directories opened successfully
    pub dirs_visited: u64,

    /// Directories that could not be opened
    pub dirs_skipped: u64,

    /// Directories skipped because they were already visited
    pub revisits: u64,

    /// Whether the walk's own root could be opened
    pub root_readable: bool,
}

/// Walk `root` depth-first. Nothing is read until the first record is pulled.
pub fn walk<'a>(scanner: &'a dyn DirectoryScanner, root: impl Into<PathBuf>) -> Walker<'a> {
    Walker::new(scanner, root)
}

/// Lazy depth-first iterator over every file below a root.
///
/// Each `Walker` reads from disk afresh; walking the same root twice reflects
/// changes made in between.
pub struct Walker<'a> {
    scanner: &'a dyn DirectoryScanner,
    root: PathBuf,
    stack: Vec<Entries>,
    visited: HashSet<DirIdentity>,
    exclude: NameFilter,
    cancel: Option<CancelToken>,
    started: bool,
    stats: WalkStats,
}

impl<'a> Walker<'a> {
    pub fn new(scanner: &'a dyn DirectoryScanner, root: impl Into<PathBuf>) -> Self {
        Walker {
            scanner,
            root: root.into(),
            stack: Vec::new(),
            visited: HashSet::new(),
            exclude: NameFilter::default(),
            cancel: None,
            started: false,
            stats: WalkStats::default(),
        }
    }

    /// Skip folders whose names match `filter`.
    pub fn with_exclude(mut self, filter: NameFilter) -> Self {
        self.exclude = filter;
        self
    }

    /// Stop at the next directory boundary once `token` is cancelled.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Counters so far.
    pub fn stats(&self) -> &WalkStats {
        &self.stats
    }

    /// Number of directories currently open.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().map_or(false, |c| c.is_cancelled())
    }

    /// Open a directory and push it on the stack. Returns false if skipped.
    fn enter(&mut self, path: &Path) -> bool {
        if let Some(identity) = self.scanner.dir_identity(path) {
            if !self.visited.insert(identity) {
                warn!(dir = %path.display(), "Directory already visited, skipping");
                self.stats.revisits += 1;
                return false;
            }
        }

        match self.scanner.read_dir(path) {
            Ok(entries) => {
                self.stack.push(entries);
                self.stats.dirs_visited += 1;
                true
            }
            Err(e) => {
                warn!(dir = %path.display(), error = %e, "Failed to scan directory");
                self.stats.dirs_skipped += 1;
                false
            }
        }
    }
}

impl Iterator for Walker<'_> {
    type Item = FileRecord;

    fn next(&mut self) -> Option<FileRecord> {
        if !self.started {
            self.started = true;
            if self.is_cancelled() {
                return None;
            }
            let root = self.root.clone();
            self.stats.root_readable = self.enter(&root);
        }

        loop {
            let entry = match self.stack.last_mut()?.next() {
                Some(entry) => entry,
                None => {
                    self.stack.pop();
                    continue;
                }
            };

            match entry {
                Entry::File(file) => {
                    self.stats.files += 1;
                    return Some(file);
                }
                Entry::Folder(folder) => {
                    if self.exclude.is_excluded(&folder.name) {
                        debug!(dir = %folder.path, "Excluded folder");
                        continue;
                    }
                    if self.is_cancelled() {
                        debug!(root = %self.root.display(), "Walk cancelled");
                        self.stack.clear();
                        return None;
                    }
                    self.enter(Path::new(&folder.path));
                }
            }
        }
    }
}
