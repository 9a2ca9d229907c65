//! Transaction entry handler.
//!
//! This module implements the form endpoint:
//! - POST /enter - record an expense or a transfer

use axum::{Form, extract::State, response::Redirect};
use chrono::Local;

use crate::{
    error::AppError,
    handlers::page_location,
    models::transaction::ExpenseForm,
    services::submission,
    state::AppState,
};

/// Record an expense or transfer.
///
/// # Form Body
///
/// ```text
/// date=2025-01-20&account=A1&category=C1&amount=10&currency=GEL&comment=Taxi&mock=
/// ```
///
/// Picking a "Transfer to ..." category records a transfer into that account.
///
/// # Response
///
/// - **Success (303 See Other)**: back to the expense page
/// - **Error (500)**: invalid input, unknown reference, or the budgeting
///   service rejected the transaction
pub async fn enter_expense(
    State(state): State<AppState>,
    Form(form): Form<ExpenseForm>,
) -> Result<Redirect, AppError> {
    let cache = state.sources.select(&form.mock);

    let tx = submission::submit_transaction(
        &form,
        cache,
        &state.ledger,
        Local::now().date_naive(),
    )
    .await?;

    tracing::info!(
        transaction_id = %tx.id,
        account_id = %tx.account_id,
        category_id = %tx.category_id,
        amount = %tx.amount,
        fixture = state.sources.is_fixture(&form.mock),
        "Transaction entered"
    );

    Ok(Redirect::to(&page_location(&form.mock)))
}
