//! One fetched copy of the budget's accounts, categories and transactions.

use crate::models::{
    account::Account,
    category::{Category, transfer_categories},
    transaction::Transaction,
};

/// Everything the page needs from one fetch of the budgeting service.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub budget_id: String,

    /// Tracked accounts, in configured order.
    pub accounts: Vec<Account>,

    /// Tracked real categories, in configured order.
    pub categories: Vec<Category>,

    /// Real categories followed by one transfer pseudo-category per account.
    pub all_categories: Vec<Category>,

    /// Transactions in the order the budgeting service returned them.
    pub transactions: Vec<Transaction>,
}

impl Snapshot {
    /// Assemble a snapshot, synthesizing the transfer pseudo-categories.
    pub fn new(
        budget_id: &str,
        accounts: Vec<Account>,
        categories: Vec<Category>,
        transactions: Vec<Transaction>,
    ) -> Self {
        let mut all_categories = categories.clone();
        all_categories.extend(transfer_categories(&accounts));
        Snapshot {
            budget_id: budget_id.to_string(),
            accounts,
            categories,
            all_categories,
            transactions,
        }
    }

    pub fn account(&self, id: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    /// Look up a category by ID, real categories taking precedence.
    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories
            .iter()
            .find(|c| c.id() == id)
            .or_else(|| self.all_categories.iter().find(|c| c.id() == id))
    }

    /// Append a transaction and apply its amount to the source account's balance.
    pub fn append(&mut self, tx: Transaction) {
        if let Some(account) = self.accounts.iter_mut().find(|a| a.id == tx.account_id) {
            account.balance = account.balance.saturating_add(tx.amount);
        }
        self.transactions.push(tx);
    }
}
