//! Explicit cache refresh.

use axum::{
    extract::{Query, State},
    response::Redirect,
};

use crate::{
    handlers::{PageParams, page_location},
    state::AppState,
};

/// Drop the cached snapshot so the next page view fetches fresh data.
///
/// # Endpoint
///
/// `POST /refresh` (optionally `?mock=<name>`)
///
/// # Response
///
/// **303 See Other** back to the expense page.
pub async fn refresh(State(state): State<AppState>, Query(params): Query<PageParams>) -> Redirect {
    state.sources.select(&params.mock).invalidate().await;
    tracing::info!(mock = %params.mock, "Cache refresh requested");
    Redirect::to(&page_location(&params.mock))
}
