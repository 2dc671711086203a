//! In-memory scanner and log capture for tests.

use crate::error::{CoreError, Result};
use crate::scanner::{DirectoryScanner, Entries};
use crate::types::{DirIdentity, Entry, FileRecord, FolderRecord};
use chrono::{TimeZone, Utc};
use std::collections::{HashMap, HashSet};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A synthetic directory tree. Entries keep insertion order, directories not
/// registered with [`MemoryScanner::dir`] behave like an offline share.
#[derive(Default)]
pub struct MemoryScanner {
    dirs: HashMap<PathBuf, Vec<Entry>>,
    unreadable: HashSet<PathBuf>,
    calls: AtomicUsize,
}

impl MemoryScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a readable directory, listing it in its parent if the parent exists.
    pub fn dir(mut self, path: &str) -> Self {
        let path = PathBuf::from(path);
        self.link_in_parent(&path);
        self.dirs.entry(path).or_default();
        self
    }

    /// Add a directory that is listed by its parent but fails to open.
    pub fn unreadable(mut self, path: &str) -> Self {
        let path = PathBuf::from(path);
        self.link_in_parent(&path);
        self.unreadable.insert(path);
        self
    }

    /// Add a file. Its parent must already exist.
    pub fn file(mut self, path: &str, size: u64) -> Self {
        let path = Path::new(path);
        let parent = path.parent().expect("file needs a parent");
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        let modified = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        self.dirs
            .get_mut(parent)
            .expect("parent directory must be registered first")
            .push(Entry::File(FileRecord::new(parent, name, size, modified)));
        self
    }

    /// Number of `read_dir` calls made so far.
    pub fn read_dir_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn link_in_parent(&mut self, path: &Path) {
        if let Some(parent) = path.parent() {
            if let Some(entries) = self.dirs.get_mut(parent) {
                let name = path.file_name().unwrap().to_string_lossy().into_owned();
                entries.push(Entry::Folder(FolderRecord::new(parent, name)));
            }
        }
    }
}

impl DirectoryScanner for MemoryScanner {
    fn read_dir(&self, path: &Path) -> Result<Entries> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unreadable.contains(path) {
            return Err(CoreError::NotReadable {
                path: path.to_path_buf(),
                reason: "permission denied".to_string(),
            });
        }
        match self.dirs.get(path) {
            Some(entries) => Ok(Box::new(entries.clone().into_iter())),
            None => Err(CoreError::NotReadable {
                path: path.to_path_buf(),
                reason: "share offline".to_string(),
            }),
        }
    }

    fn dir_identity(&self, path: &Path) -> Option<DirIdentity> {
        Some(DirIdentity::Canonical(path.to_path_buf()))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Run `f` with a subscriber that records formatted events on this thread.
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .without_time()
        .with_max_level(tracing::Level::DEBUG)
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    let logs = String::from_utf8_lossy(&buffer.0.lock().unwrap()).into_owned();
    (result, logs)
}

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Lines logged at warn level.
pub fn warnings(logs: &str) -> Vec<&str> {
    logs.lines().filter(|line| line.contains("WARN")).collect()
}
