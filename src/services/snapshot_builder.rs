//! Assemble a [`Snapshot`] from the budgeting API.
//!
//! Configured names are strict: a budget, account or category named in the
//! configuration but missing remotely fails the whole fetch. Individual
//! transactions are lenient: those that reference untracked accounts or
//! categories are skipped with a warning.

use std::collections::HashMap;

use crate::{
    error::AppError,
    models::{
        account::Account, category::Category, snapshot::Snapshot, transaction::Transaction,
    },
    services::ynab::{
        BudgetSelection, BudgetSummary, RemoteAccount, RemoteCategoryGroup, RemotePayee,
        RemoteTransaction, YnabClient,
    },
};

/// Fetch budget, accounts, payees, categories and transactions, in that order.
pub async fn build_snapshot(
    client: &YnabClient,
    selection: &BudgetSelection,
) -> Result<Snapshot, AppError> {
    let budgets = client.list_budgets().await?;
    let budget_id = find_budget_id(&budgets, &selection.budget_name)?;

    let remote_accounts = client.list_accounts(&budget_id).await?;
    let payees = client.list_payees(&budget_id).await?;
    let accounts = select_accounts(remote_accounts, &payees, &selection.accounts)?;

    let groups = client.list_category_groups(&budget_id).await?;
    let categories = select_categories(groups, &selection.categories)?;

    let remote_transactions = client.list_transactions(&budget_id).await?;
    tracing::info!(
        count = remote_transactions.len(),
        "Loaded remote transactions"
    );
    let transactions = hydrate_transactions(remote_transactions, &accounts, &categories);

    Ok(Snapshot::new(&budget_id, accounts, categories, transactions))
}

/// ID of the budget called `name`.
pub fn find_budget_id(budgets: &[BudgetSummary], name: &str) -> Result<String, AppError> {
    budgets
        .iter()
        .find(|b| b.name == name)
        .map(|b| b.id.clone())
        .ok_or_else(|| AppError::BudgetNotFound(name.to_string()))
}

/// Pick the configured accounts, in configured order, attaching transfer payees.
pub fn select_accounts(
    remote: Vec<RemoteAccount>,
    payees: &[RemotePayee],
    names: &[String],
) -> Result<Vec<Account>, AppError> {
    let payee_by_account: HashMap<&str, &str> = payees
        .iter()
        .filter(|p| !p.deleted)
        .filter_map(|p| {
            p.transfer_account_id
                .as_deref()
                .map(|account_id| (account_id, p.id.as_str()))
        })
        .collect();

    let by_name: HashMap<String, RemoteAccount> = remote
        .into_iter()
        .filter(|a| !a.deleted)
        .map(|a| (a.name.clone(), a))
        .collect();

    names
        .iter()
        .map(|name| {
            let remote = by_name
                .get(name)
                .ok_or_else(|| AppError::AccountNotFound(name.clone()))?;
            let mut account = Account::new(&remote.id, &remote.name, remote.balance);
            account.transfer_payee_id = payee_by_account
                .get(remote.id.as_str())
                .map(|id| id.to_string());
            Ok(account)
        })
        .collect()
}

/// Flatten category groups and pick the configured categories, in configured order.
pub fn select_categories(
    groups: Vec<RemoteCategoryGroup>,
    names: &[String],
) -> Result<Vec<Category>, AppError> {
    let by_name: HashMap<String, String> = groups
        .into_iter()
        .flat_map(|g| g.categories)
        .filter(|c| !c.deleted)
        .map(|c| (c.name, c.id))
        .collect();

    names
        .iter()
        .map(|name| {
            by_name
                .get(name)
                .map(|id| Category::real(id, name))
                .ok_or_else(|| AppError::CategoryNotFound(name.clone()))
        })
        .collect()
}

/// Convert remote transactions, skipping the ones this front-end cannot show.
///
/// # Skipped Records
///
/// - source account not tracked
/// - transfer into an account that is not tracked
/// - inflow side of a transfer (positive amount); the outflow side is kept
/// - plain transaction whose category is not tracked
pub fn hydrate_transactions(
    remote: Vec<RemoteTransaction>,
    accounts: &[Account],
    categories: &[Category],
) -> Vec<Transaction> {
    let accounts_by_id: HashMap<&str, &Account> =
        accounts.iter().map(|a| (a.id.as_str(), a)).collect();
    let categories_by_id: HashMap<&str, &Category> =
        categories.iter().map(|c| (c.id(), c)).collect();

    let mut result = Vec::with_capacity(remote.len());
    for t in remote.into_iter().filter(|t| !t.deleted) {
        if !accounts_by_id.contains_key(t.account_id.as_str()) {
            tracing::warn!(
                transaction_id = %t.id,
                account_id = %t.account_id,
                "Skipping transaction on untracked account"
            );
            continue;
        }

        let category_id = match t.transfer_account_id.as_deref() {
            Some(target_id) => {
                let Some(target) = accounts_by_id.get(target_id) else {
                    tracing::warn!(
                        transaction_id = %t.id,
                        account_id = %target_id,
                        "Skipping transfer to untracked account"
                    );
                    continue;
                };
                if t.amount.milliunits() > 0 {
                    tracing::debug!(
                        transaction_id = %t.id,
                        amount = %t.amount,
                        "Skipping inflow side of transfer"
                    );
                    continue;
                }
                Category::transfer_to(target).id().to_string()
            }
            None => {
                let known = t
                    .category_id
                    .as_deref()
                    .and_then(|id| categories_by_id.get(id));
                match known {
                    Some(category) => category.id().to_string(),
                    None => {
                        tracing::warn!(
                            transaction_id = %t.id,
                            category_id = t.category_id.as_deref().unwrap_or(""),
                            "Skipping transaction with untracked category"
                        );
                        continue;
                    }
                }
            }
        };

        result.push(Transaction {
            id: t.id,
            date: t.date,
            category_id,
            account_id: t.account_id,
            transfer_account_id: t.transfer_account_id,
            comment: t.memo.unwrap_or_default(),
            amount: t.amount,
            amount_in_budget_currency: t.amount,
        });
    }
    result
}
