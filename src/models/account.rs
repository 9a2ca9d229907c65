//! Tracked budget accounts.

use crate::models::amount::Amount;

/// An account from the budgeting service that this front-end tracks.
///
/// `balance` is in the budget currency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: String,

    pub name: String,

    pub balance: Amount,

    /// Payee that stands for "transfer to this account" on the budgeting service.
    ///
    /// Needed to create a transfer into this account. Filled in from the
    /// payee list, never from the account record itself.
    pub transfer_payee_id: Option<String>,
}

impl Account {
    pub fn new(id: &str, name: &str, balance: Amount) -> Self {
        Account {
            id: id.to_string(),
            name: name.to_string(),
            balance,
            transfer_payee_id: None,
        }
    }

    pub fn with_transfer_payee(mut self, payee_id: &str) -> Self {
        self.transfer_payee_id = Some(payee_id.to_string());
        self
    }
}
