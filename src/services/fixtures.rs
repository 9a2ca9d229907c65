//! Canned datasets served instead of the live budget.
//!
//! Selected with `?mock=<name>`. Fixture sources never talk to the budgeting
//! service: created transactions only land in the cache.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{
    error::AppError,
    models::{
        account::Account, amount::Amount, category::Category, snapshot::Snapshot,
        transaction::Transaction,
    },
    services::DataSource,
};

/// A data source that always returns the same snapshot.
pub struct FixtureSource {
    name: String,
    snapshot: Snapshot,
}

impl FixtureSource {
    pub fn new(name: &str, snapshot: Snapshot) -> Self {
        FixtureSource {
            name: name.to_string(),
            snapshot,
        }
    }

    /// Three accounts, two categories, two expenses and three transfers.
    pub fn simple() -> Self {
        let accounts = vec![
            Account::new("A1", "Cash", Amount::from_milliunits(345_600))
                .with_transfer_payee("TP-A1"),
            Account::new("A2", "Held By Assistant", Amount::from_milliunits(125_000))
                .with_transfer_payee("TP-A2"),
            Account::new("A3", "Alisa Business", Amount::from_milliunits(750_000))
                .with_transfer_payee("TP-A3"),
        ];
        let categories = vec![
            Category::real("C1", "Groceries"),
            Category::real("C2", "Dining Out"),
        ];

        let transactions = vec![
            fixture_tx("F1", "2025-01-14", "C2", "A1", None, "Lunch meeting", -12_990),
            fixture_tx("F2", "2025-01-15", "C1", "A1", None, "Milk", -3_450),
            fixture_tx(
                "F3",
                "2025-01-16",
                "transfer-to-A2",
                "A1",
                Some("A2"),
                "Moving funds",
                -50_000,
            ),
            fixture_tx("F4", "2025-01-17", "transfer-to-A3", "A2", Some("A3"), "", -75_000),
            fixture_tx(
                "F5",
                "2025-01-18",
                "transfer-to-A1",
                "A3",
                Some("A1"),
                "Reimbursement",
                -35_000,
            ),
        ];

        Self::new("simple", Snapshot::new("", accounts, categories, transactions))
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }
}

fn fixture_tx(
    id: &str,
    date: &str,
    category_id: &str,
    account_id: &str,
    transfer_account_id: Option<&str>,
    comment: &str,
    amount: i64,
) -> Transaction {
    let amount = Amount::from_milliunits(amount);
    Transaction {
        id: id.to_string(),
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap_or(NaiveDate::MIN),
        category_id: category_id.to_string(),
        account_id: account_id.to_string(),
        transfer_account_id: transfer_account_id.map(str::to_string),
        comment: comment.to_string(),
        amount,
        amount_in_budget_currency: amount,
    }
}

#[async_trait]
impl DataSource for FixtureSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn load(&self) -> Result<Snapshot, AppError> {
        Ok(self.snapshot.clone())
    }

    async fn create_transaction(&self, _: &Snapshot, tx: &Transaction) -> Result<(), AppError> {
        tracing::debug!(
            source = %self.name,
            comment = %tx.comment,
            "Detached source, not submitting"
        );
        Ok(())
    }
}
