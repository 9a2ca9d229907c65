//! Transaction records and the expense entry form.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::models::amount::Amount;

/// A transaction as shown in the history.
///
/// References point into the [`Snapshot`](super::snapshot::Snapshot) that
/// holds the transaction: `account_id` into its accounts, `category_id` into
/// its combined category list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub id: String,

    pub date: NaiveDate,

    pub category_id: String,

    /// Source account.
    pub account_id: String,

    /// Destination account, present only for transfers.
    pub transfer_account_id: Option<String>,

    pub comment: String,

    /// Signed amount in the budget currency; negative is an outflow.
    pub amount: Amount,

    pub amount_in_budget_currency: Amount,
}

impl Transaction {
    pub fn is_transfer(&self) -> bool {
        self.transfer_account_id.is_some()
    }
}

/// Raw fields of the expense entry form.
///
/// # Form Fields
///
/// - `date`: `YYYY-MM-DD`, blank means today
/// - `category`: category ID, possibly a transfer pseudo-category
/// - `account`: source account ID
/// - `comment`: free text
/// - `amount`: decimal amount spent, in `currency`
/// - `currency`: currency code
/// - `mock`: fixture dataset name, blank for the live budget
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpenseForm {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub account: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub mock: String,
}
