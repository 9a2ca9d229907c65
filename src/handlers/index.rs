//! The expense page.

use axum::{
    extract::{Query, State},
    response::Html,
};
use chrono::Local;

use crate::{
    error::AppError,
    handlers::PageParams,
    state::AppState,
    views::{self, IndexPage},
};

/// Render the expense page.
///
/// # Endpoint
///
/// `GET /` or `GET /?mock=simple`
///
/// # Response
///
/// - **Success (200 OK)**: HTML page with entry form, balances and history
/// - **Error (500)**: the snapshot could not be fetched
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Html<String>, AppError> {
    let cache = state.sources.select(&params.mock);
    let snapshot = cache.get(false).await?;

    let html = views::render_index(&IndexPage {
        title: &state.page.title,
        snapshot: &snapshot,
        ledger: &state.ledger,
        hide_balance: &state.page.hide_balance,
        today: Local::now().date_naive(),
        mock: &params.mock,
    })?;

    Ok(Html(html))
}
