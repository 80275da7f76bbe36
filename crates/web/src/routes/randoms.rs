//! Random-number API

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    error::{WebError, WebResult},
    randoms::{Frequencies, DEFAULT_COUNT},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct RandomsParams {
    /// Number of values to draw
    pub cant: Option<u64>,
}

/// GET /api/randoms?cant=N
///
/// Returns a frequency map of `cant` draws in 1..=1000, computed by the
/// background worker so the request path never blocks on generation.
pub async fn randoms(
    State(state): State<AppState>,
    Query(params): Query<RandomsParams>,
) -> WebResult<Json<Frequencies>> {
    let count = params.cant.unwrap_or(DEFAULT_COUNT);

    let frequencies = state.randoms.generate(count).await.map_err(|err| {
        tracing::error!(error = %err, "random-number worker unavailable");
        WebError::Internal
    })?;

    Ok(Json(frequencies))
}
