//! Search endpoints.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use sharelens_core::{CancelToken, SearchHit};

use super::error::ApiError;
use super::ServerState;

/// Query string for both search routes.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

/// Walk every shared root. If the client goes away the handler future is
/// dropped, which cancels the walk at its next directory boundary.
pub(crate) async fn search(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<SearchHit>>, ApiError> {
    let cancel = CancelToken::new();
    let guard = cancel.drop_guard();

    let hits = tokio::task::spawn_blocking(move || {
        state.app.searcher.search_with(&params.q, &cancel)
    })
    .await?;

    guard.disarm();
    Ok(Json(hits))
}

pub(crate) async fn search_indexed(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<SearchHit>>, ApiError> {
    let hits = tokio::task::spawn_blocking(move || state.app.indexed.search(&params.q)).await??;
    Ok(Json(hits))
}
