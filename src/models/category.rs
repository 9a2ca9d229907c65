//! Budget categories and transfer pseudo-categories.

use crate::models::account::Account;

/// Prefix of every transfer pseudo-category ID.
const TRANSFER_ID_PREFIX: &str = "transfer-to-";

/// A choice in the category selector.
///
/// Real categories come from the budgeting service. Transfer categories are
/// synthesized locally, one per tracked account, so that "move money to
/// account X" can be picked like any other category. The variant, not the
/// ID, decides which kind a category is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Category {
    Real {
        id: String,
        name: String,
    },
    Transfer {
        id: String,
        name: String,
        target_account_id: String,
    },
}

impl Category {
    pub fn real(id: &str, name: &str) -> Self {
        Category::Real {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    /// The transfer pseudo-category for moving money into `account`.
    ///
    /// The ID is derived from the account ID, so it is stable across fetches.
    pub fn transfer_to(account: &Account) -> Self {
        Category::Transfer {
            id: format!("{TRANSFER_ID_PREFIX}{}", account.id),
            name: format!("Transfer to {}", account.name),
            target_account_id: account.id.clone(),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Category::Real { id, .. } | Category::Transfer { id, .. } => id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Category::Real { name, .. } | Category::Transfer { name, .. } => name,
        }
    }

    pub fn is_transfer(&self) -> bool {
        matches!(self, Category::Transfer { .. })
    }

    /// Account a transfer category moves money into.
    pub fn transfer_target_id(&self) -> Option<&str> {
        match self {
            Category::Real { .. } => None,
            Category::Transfer {
                target_account_id, ..
            } => Some(target_account_id),
        }
    }
}

/// One transfer pseudo-category per account, in account order.
pub fn transfer_categories(accounts: &[Account]) -> Vec<Category> {
    accounts.iter().map(Category::transfer_to).collect()
}
