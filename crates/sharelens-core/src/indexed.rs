//! Search through the operating system's file index.
//!
//! Instead of walking the shares, this adapter asks an external program
//! (by default a PowerShell script querying Windows Search) for matching
//! paths. Results are near-instant but carry no size, timestamps or tags.
//!
//! The program receives the query as its final argument and prints the
//! matching paths separated by a delimiter. The call has a single outcome:
//! a non-zero exit, anything on stderr, or a timeout fails the whole search.

use crate::config::IndexedConfig;
use crate::error::{CoreError, Result};
use crate::media::is_previewable;
use crate::process::run_with_timeout;
use crate::search::MIN_QUERY_LEN;
use crate::types::{extension_of, SearchHit};
use std::process::Command;
use std::time::Instant;
use tracing::{debug, error, info};

/// Adapter around the external indexing program.
#[derive(Debug, Clone)]
pub struct IndexedSearch {
    config: IndexedConfig,
    public_url: String,
}

impl IndexedSearch {
    /// `public_url` is the base URL preview links point back to.
    pub fn new(config: IndexedConfig, public_url: impl Into<String>) -> Self {
        IndexedSearch {
            config,
            public_url: public_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Query the index. Queries shorter than two characters (after trimming)
    /// return no results without running anything.
    pub fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LEN {
            return Ok(Vec::new());
        }

        let start = Instant::now();
        let mut command = Command::new(&self.config.program);
        command.args(&self.config.args).arg(query);

        let output = run_with_timeout(command, self.config.timeout()).map_err(|e| {
            error!(program = %self.config.program, error = %e, "Indexed search failed to run");
            CoreError::index_unavailable(e.to_string())
        })?;

        if !output.status.success() || !output.stderr.trim().is_empty() {
            error!(
                status = %output.status,
                stderr = %output.stderr.trim(),
                "Indexed search reported an error"
            );
            let reason = if output.stderr.trim().is_empty() {
                format!("indexer exited with {}", output.status)
            } else {
                output.stderr.trim().to_string()
            };
            return Err(CoreError::index_unavailable(reason));
        }

        let hits = self.parse_output(&output.stdout);
        info!(
            query,
            hits = hits.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Indexed search complete"
        );
        Ok(hits)
    }

    /// Split the program's output into hits.
    pub fn parse_output(&self, stdout: &str) -> Vec<SearchHit> {
        stdout
            .split(self.config.delimiter.as_str())
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|path| SearchHit::from_index(path, self.preview_url(path)))
            .collect()
    }

    /// Link to the download endpoint for images and PDFs, None otherwise.
    pub fn preview_url(&self, path: &str) -> Option<String> {
        let ext = extension_of(path)?;
        if !is_previewable(&ext) {
            debug!(path, "No preview for this type");
            return None;
        }
        Some(format!(
            "{}/api/files/download?path={}",
            self.public_url,
            urlencoding::encode(path)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HitOrigin;

    fn adapter(program: &str, args: &[&str]) -> IndexedSearch {
        IndexedSearch::new(
            IndexedConfig {
                program: program.to_string(),
                args: args.iter().map(|a| a.to_string()).collect(),
                delimiter: "|~|".to_string(),
                timeout_secs: 10,
            },
            "http://files.example:3001/",
        )
    }

    #[test]
    fn test_parse_output() {
        let search = adapter("unused", &[]);
        let hits = search.parse_output("/srv/a/plan.pdf|~|/srv/b/notes.docx|~|  |~|\r\n");

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].name, "plan.pdf");
        assert_eq!(hits[0].folder.as_deref(), Some("/srv/a"));
        assert_eq!(hits[0].origin, HitOrigin::Index);
        assert_eq!(
            hits[0].preview.as_deref(),
            Some("http://files.example:3001/api/files/download?path=%2Fsrv%2Fa%2Fplan.pdf")
        );
        assert_eq!(hits[1].name, "notes.docx");
        assert!(hits[1].preview.is_none());
    }

    #[test]
    fn test_preview_types() {
        let search = adapter("unused", &[]);
        for path in ["x.JPG", "x.jpeg", "x.png", "x.gif", "x.pdf"] {
            assert!(search.preview_url(path).is_some(), "{path}");
        }
        for path in ["x.txt", "x.mp4", "x"] {
            assert!(search.preview_url(path).is_none(), "{path}");
        }
    }

    #[test]
    fn test_short_query_spawns_nothing() {
        let search = adapter("sharelens-no-such-program", &[]);
        assert!(search.search(" a ").unwrap().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_query_is_passed_as_last_argument() {
        // sh -c SCRIPT NAME QUERY: the query lands in $1
        let search = adapter("sh", &["-c", "printf '/srv/%s.pdf|~|/srv/other.txt' \"$1\"", "indexer"]);
        let hits = search.search("  site plan ").unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].path, "/srv/site plan.pdf");
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_is_unavailable() {
        let search = adapter("sh", &["-c", "printf '/srv/a.pdf'; exit 1", "indexer"]);
        let err = search.search("report").unwrap_err();
        assert!(matches!(err, CoreError::IndexUnavailable { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_stderr_is_unavailable() {
        let search = adapter("sh", &["-c", "printf '/srv/a.pdf'; echo 'search service stopped' >&2", "indexer"]);
        let err = search.search("report").unwrap_err();
        assert!(err.to_string().contains("search service stopped"));
    }

    #[test]
    fn test_missing_program_is_unavailable() {
        let search = adapter("sharelens-no-such-program", &[]);
        let err = search.search("report").unwrap_err();
        assert!(matches!(err, CoreError::IndexUnavailable { .. }));
    }
}
