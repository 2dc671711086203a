//! File type tables and AVI conversion.
//!
//! The browser previews a small, fixed set of types inline; everything else
//! is offered as a download. AVI videos cannot be played by browsers, so they
//! are converted once to a sibling MP4 by an external ffmpeg.

use crate::config::ConvertConfig;
use crate::error::{CoreError, Result};
use crate::process::run_with_timeout;
use crate::types::extension_of;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;
use tracing::{error, info};

/// Extensions shown inline by the browser.
pub const INLINE_EXTENSIONS: &[&str] = &["pdf", "jpg", "jpeg", "png", "gif", "txt", "mp4"];

/// Extensions that get a preview link in indexed search results.
pub const PREVIEW_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "pdf"];

/// MIME type for a lowercase extension.
pub fn mime_for_extension(ext: &str) -> &'static str {
    match ext {
        "pdf" => "application/pdf",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "txt" => "text/plain",
        "mp4" => "video/mp4",
        _ => "application/octet-stream",
    }
}

/// MIME type for a file path.
pub fn mime_for_path(path: &Path) -> &'static str {
    path.file_name()
        .and_then(|name| extension_of(&name.to_string_lossy()))
        .map_or("application/octet-stream", |ext| mime_for_extension(&ext))
}

/// Whether a file should be displayed inline rather than downloaded.
pub fn is_inline(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| extension_of(&name.to_string_lossy()))
        .map_or(false, |ext| INLINE_EXTENSIONS.contains(&ext.as_str()))
}

/// Whether a lowercase extension gets a preview link.
pub fn is_previewable(ext: &str) -> bool {
    PREVIEW_EXTENSIONS.contains(&ext)
}

/// Converts AVI files to an MP4 sibling of the source file.
#[derive(Debug, Clone)]
pub struct AviConverter {
    config: ConvertConfig,
}

impl AviConverter {
    pub fn new(config: ConvertConfig) -> Self {
        AviConverter { config }
    }

    /// Where the converted copy of `source` lives.
    pub fn target_for(source: &Path) -> Result<PathBuf> {
        let is_avi = source
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("avi"));
        if !is_avi {
            return Err(CoreError::NotAvi {
                path: source.to_path_buf(),
            });
        }
        Ok(source.with_extension("mp4"))
    }

    /// Convert `source`, reusing an existing conversion. Returns the MP4 path.
    pub fn convert(&self, source: &Path) -> Result<PathBuf> {
        let target = Self::target_for(source)?;
        if target.exists() {
            info!(target = %target.display(), "Already converted");
            return Ok(target);
        }

        info!(source = %source.display(), target = %target.display(), "Converting AVI to MP4");
        let start = Instant::now();

        let mut command = Command::new(&self.config.ffmpeg);
        command
            .arg("-nostdin")
            .arg("-hide_banner")
            .arg("-i")
            .arg(source)
            .arg(&target);

        // ffmpeg logs progress on stderr, so only the exit status counts
        let output = run_with_timeout(command, self.config.timeout()).map_err(|e| {
            error!(error = %e, "Converter failed to run");
            CoreError::conversion(e.to_string())
        })?;

        if !output.status.success() {
            let detail = output.stderr.lines().last().unwrap_or_default().to_string();
            error!(status = %output.status, detail = %detail, "Converter failed");
            // Do not leave a truncated file that would later count as converted
            let _ = std::fs::remove_file(&target);
            return Err(CoreError::conversion(format!(
                "ffmpeg exited with {}: {}",
                output.status, detail
            )));
        }

        info!(
            target = %target.display(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Conversion complete"
        );
        Ok(target)
    }
}
