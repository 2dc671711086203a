//! # Sharelens Core Library
//!
//! This crate provides the scanning, tagging and search functionality behind
//! the Sharelens file-share browser. It is synchronous and platform-agnostic;
//! the HTTP layer runs its operations on blocking worker threads.
//!
//! ## Architecture
//!
//! - **Scanner** (`scanner`): Lists one directory behind the `DirectoryScanner` trait
//! - **Walker** (`walker`): Lazy depth-first traversal of a whole subtree
//! - **Tags** (`tags`): Fail-open loading of user-assigned tags
//! - **Search** (`search`): Query matching and the multi-root orchestrator
//! - **Indexed** (`indexed`): Search through the OS file index
//! - **Media** (`media`): MIME table, inline previews, AVI conversion
//! - **Config** (`config`): Configuration management
//!
//! ## Example
//!
//! ```rust,ignore
//! use sharelens_core::{Config, LocalScanner, Searcher};
//! use std::sync::Arc;
//!
//! let config = Config::load()?;
//! let searcher = Searcher::from_config(&config, Arc::new(LocalScanner))?;
//! for hit in searcher.search("report") {
//!     println!("{}", hit.path);
//! }
//! ```

pub mod cancel;
pub mod config;
pub mod error;
pub mod indexed;
pub mod media;
pub mod process;
pub mod scanner;
pub mod search;
pub mod tags;
pub mod types;
pub mod walker;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use cancel::{CancelOnDrop, CancelToken};
pub use config::Config;
pub use error::{CoreError, Result};
pub use indexed::IndexedSearch;
pub use media::AviConverter;
pub use scanner::{scan, DirectoryScanner, LocalScanner};
pub use search::{QueryMatcher, Searcher, MIN_QUERY_LEN};
pub use tags::TagStore;
pub use types::{
    DirectoryListing, Entry, FileRecord, FolderRecord, HitOrigin, SearchHit, SharedRoot, TagMap,
};
pub use walker::{walk, NameFilter, WalkStats, Walker};
