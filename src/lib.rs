//! Expense entry front-end for a YNAB budget.
//!
//! Shows tracked account balances and recent transactions from the budgeting
//! service, and records new expenses and transfers, converting foreign
//! currency amounts into the budget currency.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server), HTML rendered in [`views`]
//! - **Data**: fetched from the budgeting API with reqwest, cached for five
//!   minutes per data source in [`services::cache`]
//! - **Money**: integer milliunits ([`models::amount::Amount`]), currency
//!   conversion through the budget currency ([`models::currency::Ledger`])

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;
pub mod views;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the HTTP router.
///
/// # Routes
///
/// - `GET /` - expense page
/// - `POST /enter` - record an expense or transfer
/// - `POST /refresh` - drop the cached snapshot
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index::index))
        .route("/enter", post(handlers::transactions::enter_expense))
        .route("/refresh", post(handlers::refresh::refresh))
        .layer(
            ServiceBuilder::new()
                // per-request spans
                .layer(TraceLayer::new_for_http())
                .layer(axum_middleware::from_fn(middleware::failures::log_failures)),
        )
        .with_state(state)
}
