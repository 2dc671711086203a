//! Directory listing, file streaming, text preview and AVI conversion.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use sharelens_core::media::{is_inline, mime_for_path};
use sharelens_core::{scan, CoreError, DirectoryListing};
use tokio_util::io::ReaderStream;
use tracing::{error, info};

use super::error::ApiError;
use super::ServerState;

/// Query string carrying a filesystem path.
#[derive(Debug, Deserialize)]
pub struct PathParams {
    #[serde(default)]
    pub path: String,
}

/// Response payload for a finished conversion.
#[derive(Debug, Serialize)]
pub struct ConvertResponse {
    pub path: String,
}

pub(crate) async fn list(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<PathParams>,
) -> Result<Json<DirectoryListing>, ApiError> {
    info!(path = %params.path, "Listing folder");
    let listing = tokio::task::spawn_blocking(move || {
        scan(state.app.scanner.as_ref(), Path::new(&params.path))
    })
    .await?
    .map_err(|e| {
        error!(error = %e, "Error reading folder");
        ApiError::internal(format!("Failed to read folder: {}", e))
    })?;
    Ok(Json(listing))
}

pub(crate) async fn download(Query(params): Query<PathParams>) -> Result<Response, ApiError> {
    let path = PathBuf::from(&params.path);
    info!(path = %path.display(), "Download request");

    let metadata = tokio::fs::metadata(&path).await;
    let metadata = match metadata {
        Ok(metadata) if metadata.is_file() => metadata,
        Ok(_) => {
            error!(path = %path.display(), "Download requested for a directory");
            return Err(ApiError::internal("Error streaming file: not a regular file"));
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(CoreError::NotFound { path }.into())
        }
        Err(e) => return Err(ApiError::internal(format!("Error streaming file: {}", e))),
    };

    let file = tokio::fs::File::open(&path).await.map_err(|e| {
        error!(path = %path.display(), error = %e, "Stream error");
        ApiError::internal(format!("Error streaming file: {}", e))
    })?;

    let disposition = content_disposition(&path)?;
    Response::builder()
        .header(header::CONTENT_TYPE, mime_for_path(&path))
        .header(header::CONTENT_DISPOSITION, disposition)
        .header(header::CONTENT_LENGTH, metadata.len())
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|e| ApiError::internal(e.to_string()))
}

/// `inline` for browser-previewable types, `attachment` otherwise.
fn content_disposition(path: &Path) -> Result<HeaderValue, ApiError> {
    let kind = if is_inline(path) { "inline" } else { "attachment" };
    let name: String = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
        .chars()
        .map(|c| match c {
            '"' => '\'',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    HeaderValue::from_bytes(format!("{}; filename=\"{}\"", kind, name).as_bytes())
        .map_err(|e| ApiError::internal(e.to_string()))
}

pub(crate) async fn text(Query(params): Query<PathParams>) -> Result<Response, ApiError> {
    let path = PathBuf::from(params.path);
    let contents = tokio::fs::read(&path).await;
    match contents {
        Ok(bytes) => Ok((
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            String::from_utf8_lossy(&bytes).into_owned(),
        )
            .into_response()),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(CoreError::NotFound { path }.into()),
        Err(e) => Err(ApiError::internal(format!("Error reading text file: {}", e))),
    }
}

pub(crate) async fn convert_avi(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<PathParams>,
) -> Result<Json<ConvertResponse>, ApiError> {
    let source = PathBuf::from(params.path);
    let target =
        tokio::task::spawn_blocking(move || state.app.converter.convert(&source)).await??;
    Ok(Json(ConvertResponse {
        path: target.to_string_lossy().into_owned(),
    }))
}
