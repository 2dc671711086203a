//! Core data types for Sharelens.
//!
//! This module defines the records produced by scanning and searching. They
//! are snapshots taken at scan time: nothing here is kept alive beyond the
//! response that produced it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Mapping from absolute file path to the user tags attached to it.
///
/// Keys are compared by exact string equality, so two spellings of the same
/// path (case, trailing separators) are different keys.
pub type TagMap = HashMap<String, Vec<String>>;

/// A single regular file found while scanning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Base name (e.g., "report.pdf")
    pub name: String,

    /// Full path including the base name, with OS-native separators
    pub path: String,

    /// Size in bytes
    pub size: u64,

    /// Last modification time
    pub modified: DateTime<Utc>,
}

impl FileRecord {
    /// Build a record for `name` inside `parent`.
    pub fn new(parent: &Path, name: impl Into<String>, size: u64, modified: DateTime<Utc>) -> Self {
        let name = name.into();
        let path = parent.join(&name).to_string_lossy().into_owned();
        FileRecord {
            name,
            path,
            size,
            modified,
        }
    }
}

/// An immediate child directory. Children are not attached; they are listed
/// on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderRecord {
    pub name: String,
    pub path: String,
}

impl FolderRecord {
    pub fn new(parent: &Path, name: impl Into<String>) -> Self {
        let name = name.into();
        let path = parent.join(&name).to_string_lossy().into_owned();
        FolderRecord { name, path }
    }
}

/// One row of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    File(FileRecord),
    Folder(FolderRecord),
}

/// The immediate contents of one directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectoryListing {
    pub files: Vec<FileRecord>,
    pub folders: Vec<FolderRecord>,
}

/// A statically configured entry point into the filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedRoot {
    /// Display name (e.g., "DESIGNTEAM")
    pub name: String,

    /// Filesystem path of the share (e.g., "G:\\DESIGNTEAM")
    pub path: PathBuf,
}

impl SharedRoot {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        SharedRoot {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// Identity of a directory used to detect revisits during one walk.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DirIdentity {
    /// Device and inode numbers
    Inode { dev: u64, ino: u64 },
    /// Canonicalized path, where inode numbers are not available
    Canonical(PathBuf),
}

/// Which search path produced a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HitOrigin {
    /// The recursive multi-root walk
    Walk,
    /// The OS-native file index
    Index,
}

/// A search result from either search path.
///
/// Walk hits carry size, modification time and the tags of the file; index
/// hits carry the parent folder and a preview link, since the native index
/// does not guarantee metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub name: String,
    pub path: String,
    pub origin: HitOrigin,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,

    /// Link to an inline preview, null when the type is not previewable
    #[serde(default)]
    pub preview: Option<String>,
}

impl SearchHit {
    /// Hit produced by the recursive walk.
    pub fn from_walk(record: FileRecord, tags: Vec<String>) -> Self {
        SearchHit {
            name: record.name,
            path: record.path,
            origin: HitOrigin::Walk,
            size: Some(record.size),
            modified: Some(record.modified),
            tags,
            folder: None,
            preview: None,
        }
    }

    /// Hit produced by the native index.
    pub fn from_index(path: &str, preview: Option<String>) -> Self {
        let as_path = Path::new(path);
        let name = as_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string());
        let folder = as_path
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();
        SearchHit {
            name,
            path: path.to_string(),
            origin: HitOrigin::Index,
            size: None,
            modified: None,
            tags: Vec::new(),
            folder: Some(folder),
            preview,
        }
    }
}

/// Lowercase extension of a file name, without the dot.
pub fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
}
