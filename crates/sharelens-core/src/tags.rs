//! Read-only access to user-assigned file tags.
//!
//! Tags live in a JSON object mapping absolute file paths to arrays of tag
//! strings, written by a separate tagging workflow:
//!
//! ```json
//! { "G:\\DESIGNTEAM\\site-plan.pdf": ["invoice", "2019"] }
//! ```
//!
//! The store is fail-open: any problem reading or parsing the file yields an
//! empty map, so searches degrade to name-only matching instead of failing.

use crate::types::TagMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Location of the persisted tag map.
#[derive(Debug, Clone)]
pub struct TagStore {
    path: PathBuf,
}

impl TagStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        TagStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole map from disk. Never fails; see the module docs.
    pub fn load(&self) -> TagMap {
        let contents = match fs::read(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No tag store, matching names only");
                return TagMap::new();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read tag store");
                return TagMap::new();
            }
        };

        match serde_json::from_slice::<TagMap>(&contents) {
            Ok(tags) => {
                debug!(path = %self.path.display(), entries = tags.len(), "Loaded tag store");
                tags
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Tag store is not valid, ignoring it");
                TagMap::new()
            }
        }
    }
}
