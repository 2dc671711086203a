//! Search across the configured shared roots.
//!
//! This module provides:
//! - [`QueryMatcher`]: case-insensitive substring matching against a file's
//!   name and its tags
//! - [`Searcher`]: the multi-root orchestrator that walks every shared root
//!   in configuration order and collects the matching files
//!
//! ## Cost Guard
//!
//! Queries shorter than [`MIN_QUERY_LEN`] characters would match most of a
//! multi-terabyte tree, so they return no results without touching the
//! filesystem.

use crate::cancel::CancelToken;
use crate::config::Config;
use crate::error::Result;
use crate::scanner::DirectoryScanner;
use crate::tags::TagStore;
use crate::types::{FileRecord, SearchHit, SharedRoot, TagMap};
use crate::walker::{NameFilter, Walker};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Minimum number of characters in a search query.
pub const MIN_QUERY_LEN: usize = 2;

/// Lowercase `raw` if it is long enough to be searched for.
pub fn normalize_query(raw: &str) -> Option<String> {
    if raw.chars().count() < MIN_QUERY_LEN {
        return None;
    }
    Some(raw.to_lowercase())
}

/// Check a record against an already lower-cased query.
///
/// Matches if the name contains the query, or if any of the record's tags
/// does, ignoring case.
pub fn matches(record: &FileRecord, lower_query: &str, tags: &[String]) -> bool {
    record.name.to_lowercase().contains(lower_query)
        || tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(lower_query))
}

/// A validated, lower-cased query.
#[derive(Debug, Clone)]
pub struct QueryMatcher {
    pattern_lower: String,
}

impl QueryMatcher {
    /// Returns None if the query is shorter than [`MIN_QUERY_LEN`].
    pub fn new(raw: &str) -> Option<Self> {
        normalize_query(raw).map(|pattern_lower| QueryMatcher { pattern_lower })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern_lower
    }

    /// Check a record, looking its tags up in `tags`.
    pub fn matches(&self, record: &FileRecord, tags: &TagMap) -> bool {
        let record_tags = tags.get(&record.path).map(Vec::as_slice).unwrap_or(&[]);
        matches(record, &self.pattern_lower, record_tags)
    }
}

/// Multi-root search orchestrator.
///
/// Holds only immutable configuration, so one `Searcher` can serve any
/// number of concurrent searches.
pub struct Searcher {
    roots: Vec<SharedRoot>,
    scanner: Arc<dyn DirectoryScanner>,
    tags: TagStore,
    exclude: NameFilter,
    max_results: usize,
}

impl Searcher {
    pub fn new(roots: Vec<SharedRoot>, scanner: Arc<dyn DirectoryScanner>, tags: TagStore) -> Self {
        Searcher {
            roots,
            scanner,
            tags,
            exclude: NameFilter::default(),
            max_results: 0,
        }
    }

    /// Build a searcher from the process configuration.
    pub fn from_config(config: &Config, scanner: Arc<dyn DirectoryScanner>) -> Result<Self> {
        Ok(
            Searcher::new(config.roots.clone(), scanner, TagStore::new(config.tags_path()?))
                .with_exclude(config.exclude_filter()?)
                .with_max_results(config.general.max_results),
        )
    }

    /// Skip folders whose names match `filter`.
    pub fn with_exclude(mut self, filter: NameFilter) -> Self {
        self.exclude = filter;
        self
    }

    /// Stop after `limit` hits (0 = unlimited).
    pub fn with_max_results(mut self, limit: usize) -> Self {
        self.max_results = limit;
        self
    }

    pub fn roots(&self) -> &[SharedRoot] {
        &self.roots
    }

    /// Search every root for files whose name or tags contain `query`.
    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        self.search_with(query, &CancelToken::new())
    }

    /// Like [`Searcher::search`], stopping early once `cancel` fires.
    ///
    /// Results come in root configuration order, then walk order within each
    /// root. A root that cannot be read, or whose scanner panics, is logged
    /// and skipped; hits already found are kept.
    pub fn search_with(&self, query: &str, cancel: &CancelToken) -> Vec<SearchHit> {
        let Some(matcher) = QueryMatcher::new(query) else {
            debug!(query, "Query too short, skipping search");
            return Vec::new();
        };

        let start = Instant::now();
        let tags = self.tags.load();
        let mut hits = Vec::new();

        for root in &self.roots {
            if cancel.is_cancelled() {
                break;
            }
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                self.search_root(root, &matcher, &tags, cancel, &mut hits)
            }));
            match outcome {
                Ok(true) => {
                    info!(limit = self.max_results, "Result limit reached");
                    break;
                }
                Ok(false) => {}
                Err(_) => {
                    warn!(root = %root.name, path = %root.path.display(), "Search panicked inside root, skipping it");
                }
            }
        }

        info!(
            query = matcher.pattern(),
            hits = hits.len(),
            cancelled = cancel.is_cancelled(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Search complete"
        );
        hits
    }

    /// Walk one root, appending hits. Returns true once the limit is reached.
    fn search_root(
        &self,
        root: &SharedRoot,
        matcher: &QueryMatcher,
        tags: &TagMap,
        cancel: &CancelToken,
        hits: &mut Vec<SearchHit>,
    ) -> bool {
        let before = hits.len();
        let mut walker = Walker::new(self.scanner.as_ref(), &root.path)
            .with_exclude(self.exclude.clone())
            .with_cancel(cancel.clone());

        let mut limit_reached = false;
        for record in walker.by_ref() {
            if matcher.matches(&record, tags) {
                let record_tags = tags.get(&record.path).cloned().unwrap_or_default();
                hits.push(SearchHit::from_walk(record, record_tags));
                if self.max_results > 0 && hits.len() >= self.max_results {
                    limit_reached = true;
                    break;
                }
            }
        }

        let stats = walker.stats();
        if !stats.root_readable && !cancel.is_cancelled() {
            warn!(root = %root.name, path = %root.path.display(), "Search read failed for root");
        }
        debug!(
            root = %root.name,
            files = stats.files,
            dirs = stats.dirs_visited,
            skipped = stats.dirs_skipped,
            hits = hits.len() - before,
            "Root searched"
        );

        limit_reached
    }
}
