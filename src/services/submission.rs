//! Expense and transfer submission.
//!
//! # Process
//!
//! 1. Read the current snapshot from the cache
//! 2. Validate the form and resolve it against the snapshot into a [`Transaction`]
//! 3. Record the transaction on the data source
//! 4. Append it to the cached snapshot
//!
//! Nothing is sent or cached when step 2 fails, and the cache is not
//! touched when step 3 fails.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        amount::Amount,
        currency::Ledger,
        snapshot::Snapshot,
        transaction::{ExpenseForm, Transaction},
    },
    services::cache::SnapshotCache,
};

/// Turn a submitted form into a transaction, without side effects.
///
/// The entered amount is money spent: the resulting transaction carries it
/// negated, in the budget currency. Foreign amounts are converted, rounded up
/// to whole cents, and noted at the front of the comment.
///
/// # Errors
///
/// - `Validation`: unparseable date or amount, an amount out of range after
///   conversion, or a negative transfer
/// - `CurrencyNotFound`, `AccountNotFound`, `CategoryNotFound`: unknown references
pub fn prepare_transaction(
    form: &ExpenseForm,
    snapshot: &Snapshot,
    ledger: &Ledger,
    today: NaiveDate,
) -> Result<Transaction, AppError> {
    let date = parse_date(form.date.trim(), today)?;
    let category_id = form.category.trim();
    let account_id = form.account.trim();
    let user_comment = form.comment.trim();
    let currency_code = form.currency.trim();

    let entered = Amount::parse_decimal(&form.amount)?;

    let mut comment = user_comment.to_string();
    let spent = if currency_code == ledger.budget().code {
        entered
    } else {
        let currency = ledger.currency(currency_code)?;
        let original = ledger.format(entered, currency, true);
        comment = if user_comment.is_empty() {
            original
        } else {
            format!("{original} {user_comment}")
        };
        ledger
            .checked_convert(entered, currency, ledger.budget())
            .and_then(Amount::rounded_up_to_deci_cents)
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "amount {} {} is out of range",
                    form.amount.trim(),
                    currency.code
                ))
            })?
    };

    let account = snapshot
        .account(account_id)
        .ok_or_else(|| AppError::AccountNotFound(account_id.to_string()))?;
    let category = snapshot
        .category(category_id)
        .ok_or_else(|| AppError::CategoryNotFound(category_id.to_string()))?;

    let transfer_account_id = match category.transfer_target_id() {
        Some(target_id) => {
            let target = snapshot
                .account(target_id)
                .ok_or_else(|| AppError::AccountNotFound(target_id.to_string()))?;
            if spent.milliunits() < 0 {
                return Err(AppError::Validation(format!(
                    "transfer amount {} must not be negative",
                    form.amount.trim()
                )));
            }
            // a transfer without a user comment carries no conversion note either
            if user_comment.is_empty() {
                comment.clear();
            }
            Some(target.id.clone())
        }
        None => None,
    };

    let amount = spent.checked_neg().ok_or_else(|| {
        AppError::Validation(format!("amount {} is out of range", form.amount.trim()))
    })?;

    Ok(Transaction {
        id: Uuid::new_v4().to_string(),
        date,
        category_id: category.id().to_string(),
        account_id: account.id.clone(),
        transfer_account_id,
        comment,
        amount,
        amount_in_budget_currency: amount,
    })
}

fn parse_date(text: &str, today: NaiveDate) -> Result<NaiveDate, AppError> {
    if text.is_empty() {
        return Ok(today);
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("date {text:?} is not YYYY-MM-DD")))
}

/// Validate, record and cache a submitted expense or transfer.
pub async fn submit_transaction(
    form: &ExpenseForm,
    cache: &SnapshotCache,
    ledger: &Ledger,
    today: NaiveDate,
) -> Result<Transaction, AppError> {
    let snapshot = cache.get(false).await?;
    let tx = prepare_transaction(form, &snapshot, ledger, today)?;

    cache.source().create_transaction(&snapshot, &tx).await?;

    if !cache.append_transaction(tx.clone()).await {
        tracing::debug!(
            transaction_id = %tx.id,
            "Cache empty, transaction will appear on next fetch"
        );
    }
    Ok(tx)
}
