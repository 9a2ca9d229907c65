//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives request data (query string or form body)
//! 2. Picks the snapshot cache for the requested data source
//! 3. Returns an HTML page or a redirect back to it

use serde::Deserialize;

/// Expense page
pub mod index;
/// Cache refresh
pub mod refresh;
/// Expense and transfer entry
pub mod transactions;

/// Query parameters shared by the page and the refresh action.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    /// Fixture dataset name, blank for the live budget.
    #[serde(default)]
    pub mock: String,
}

/// Location of the expense page, keeping the fixture selection.
pub(crate) fn page_location(mock: &str) -> String {
    crate::views::with_mock("/", mock)
}
