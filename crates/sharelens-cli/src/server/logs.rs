//! Preview access log.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{SecondsFormat, Utc};
use parking_lot::Mutex;
use serde::Deserialize;
use tracing::{debug, error};

use super::error::ApiError;
use super::ServerState;

/// Append-only log of previewed files.
#[derive(Debug)]
pub struct PreviewLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl PreviewLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        PreviewLog {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one `[timestamp] Previewed: <path>` line.
    pub fn record(&self, file_path: &str) -> io::Result<()> {
        let line = format!(
            "[{}] Previewed: {}\n",
            Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            file_path
        );

        // Concurrent appends must not interleave
        let _guard = self.lock.lock();
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())
    }
}

/// Request payload for a preview record.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRequest {
    #[serde(default)]
    pub file_path: String,
}

pub(crate) async fn record_preview(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<PreviewRequest>,
) -> Result<StatusCode, ApiError> {
    debug!(path = %request.file_path, "Preview recorded");
    tokio::task::spawn_blocking(move || state.preview_log.record(&request.file_path))
        .await?
        .map_err(|e| {
            error!(error = %e, "Failed to write preview log");
            ApiError::internal(format!("Failed to write preview log: {}", e))
        })?;
    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_record_appends_lines() {
        let temp_dir = TempDir::new().unwrap();
        let log = PreviewLog::new(temp_dir.path().join("logs").join("preview.log"));

        log.record("/share/a.pdf").unwrap();
        log.record("/share/b.png").unwrap();

        let content = fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].ends_with("] Previewed: /share/a.pdf"));
        assert!(lines[1].ends_with("] Previewed: /share/b.png"));
    }

    #[test]
    fn test_concurrent_records_do_not_interleave() {
        let temp_dir = TempDir::new().unwrap();
        let log = Arc::new(PreviewLog::new(temp_dir.path().join("preview.log")));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let log = log.clone();
                std::thread::spawn(move || {
                    for j in 0..25 {
                        log.record(&format!("/share/{}-{}.pdf", i, j)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let content = fs::read_to_string(log.path()).unwrap();
        assert_eq!(content.lines().count(), 200);
        assert!(content.lines().all(|line| line.contains("] Previewed: /share/")));
    }
}
