//! Budgeting API client and the live data source built on it.
//!
//! Every response from the API is wrapped in a `{"data": ...}` envelope and
//! amounts are reported in milliunits.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use url::Url;

use crate::{
    config::BudgetConfig,
    error::AppError,
    models::{amount::Amount, snapshot::Snapshot, transaction::Transaction},
    services::{DataSource, snapshot_builder},
};

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BudgetSummary {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteAccount {
    pub id: String,
    pub name: String,
    pub balance: Amount,
    #[serde(default)]
    pub deleted: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemotePayee {
    pub id: String,
    /// Set when this payee represents transfers into the given account.
    pub transfer_account_id: Option<String>,
    #[serde(default)]
    pub deleted: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteCategory {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub deleted: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteCategoryGroup {
    #[serde(default)]
    pub categories: Vec<RemoteCategory>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteTransaction {
    pub id: String,
    pub date: NaiveDate,
    pub amount: Amount,
    pub memo: Option<String>,
    pub account_id: String,
    pub category_id: Option<String>,
    pub transfer_account_id: Option<String>,
    #[serde(default)]
    pub deleted: bool,
}

/// Body of a create-transaction call.
///
/// Either `category_id` (plain expense) or `payee_id` (transfer) is set; the
/// other is sent as null.
#[derive(Debug, Clone, Serialize)]
pub struct NewTransaction {
    pub account_id: String,
    pub date: NaiveDate,
    pub amount: Amount,
    pub memo: String,
    pub cleared: &'static str,
    pub approved: bool,
    pub category_id: Option<String>,
    pub payee_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BudgetList {
    budgets: Vec<BudgetSummary>,
}

#[derive(Debug, Deserialize)]
struct AccountList {
    accounts: Vec<RemoteAccount>,
}

#[derive(Debug, Deserialize)]
struct PayeeList {
    payees: Vec<RemotePayee>,
}

#[derive(Debug, Deserialize)]
struct CategoryGroupList {
    category_groups: Vec<RemoteCategoryGroup>,
}

#[derive(Debug, Deserialize)]
struct TransactionList {
    transactions: Vec<RemoteTransaction>,
}

#[derive(Debug, Serialize)]
struct CreateTransaction<'a> {
    transaction: &'a NewTransaction,
}

/// Thin client for the budgeting API.
#[derive(Debug, Clone)]
pub struct YnabClient {
    http: reqwest::Client,
    base_url: Url,
    token: String,
}

impl YnabClient {
    /// # Errors
    ///
    /// `AppError::Config` if `base_url` is not a valid URL or the HTTP
    /// client cannot be built.
    pub fn new(base_url: &str, token: &str, timeout: Duration) -> Result<Self, AppError> {
        let mut base = base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .map_err(|e| AppError::Config(format!("invalid API URL {base_url:?}: {e}")))?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("HTTP client error: {e}")))?;

        Ok(YnabClient {
            http,
            base_url,
            token: token.to_string(),
        })
    }

    fn url(&self, path: &str) -> Result<Url, AppError> {
        self.base_url
            .join(path)
            .map_err(|e| AppError::Config(format!("invalid API path {path:?}: {e}")))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        call: &'static str,
        path: &str,
    ) -> Result<T, AppError> {
        let url = self.url(path)?;
        tracing::debug!(call, method = "GET", %url, "Remote call");

        let response = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        let response = check_status(call, response).await?;
        let envelope: Envelope<T> = response.json().await?;
        Ok(envelope.data)
    }

    async fn post<B: Serialize>(
        &self,
        call: &'static str,
        path: &str,
        body: &B,
    ) -> Result<(), AppError> {
        let url = self.url(path)?;
        tracing::debug!(call, method = "POST", %url, "Remote call");

        let response = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;
        check_status(call, response).await?;
        Ok(())
    }

    pub async fn list_budgets(&self) -> Result<Vec<BudgetSummary>, AppError> {
        let list: BudgetList = self.get("ListBudgets", "budgets").await?;
        Ok(list.budgets)
    }

    pub async fn list_accounts(&self, budget_id: &str) -> Result<Vec<RemoteAccount>, AppError> {
        let list: AccountList = self
            .get("ListAccounts", &format!("budgets/{budget_id}/accounts"))
            .await?;
        Ok(list.accounts)
    }

    pub async fn list_payees(&self, budget_id: &str) -> Result<Vec<RemotePayee>, AppError> {
        let list: PayeeList = self
            .get("ListPayees", &format!("budgets/{budget_id}/payees"))
            .await?;
        Ok(list.payees)
    }

    pub async fn list_category_groups(
        &self,
        budget_id: &str,
    ) -> Result<Vec<RemoteCategoryGroup>, AppError> {
        let list: CategoryGroupList = self
            .get("ListCategories", &format!("budgets/{budget_id}/categories"))
            .await?;
        Ok(list.category_groups)
    }

    pub async fn list_transactions(
        &self,
        budget_id: &str,
    ) -> Result<Vec<RemoteTransaction>, AppError> {
        let list: TransactionList = self
            .get("ListTransactions", &format!("budgets/{budget_id}/transactions"))
            .await?;
        Ok(list.transactions)
    }

    pub async fn create_transaction(
        &self,
        budget_id: &str,
        transaction: &NewTransaction,
    ) -> Result<(), AppError> {
        self.post(
            "CreateTransaction",
            &format!("budgets/{budget_id}/transactions"),
            &CreateTransaction { transaction },
        )
        .await
    }
}

/// Turn a non-success status into `AppError::RemoteStatus`, keeping the body for the log.
async fn check_status(
    call: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, AppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(AppError::RemoteStatus {
        call,
        status: status.as_u16(),
        body,
    })
}

/// Which budget, accounts and categories to load.
#[derive(Debug, Clone, Default)]
pub struct BudgetSelection {
    pub budget_name: String,
    pub accounts: Vec<String>,
    pub categories: Vec<String>,
}

impl From<&BudgetConfig> for BudgetSelection {
    fn from(config: &BudgetConfig) -> Self {
        BudgetSelection {
            budget_name: config.budget_name.clone(),
            accounts: config.accounts.clone(),
            categories: config.categories.clone(),
        }
    }
}

/// The live budget on the budgeting service.
pub struct YnabSource {
    client: YnabClient,
    selection: BudgetSelection,
}

impl YnabSource {
    pub fn new(client: YnabClient, selection: BudgetSelection) -> Self {
        YnabSource { client, selection }
    }
}

#[async_trait]
impl DataSource for YnabSource {
    fn name(&self) -> &str {
        "ynab"
    }

    async fn load(&self) -> Result<Snapshot, AppError> {
        snapshot_builder::build_snapshot(&self.client, &self.selection).await
    }

    /// Transfers go to the target account's transfer payee without a
    /// category; plain expenses go to their category without a payee.
    async fn create_transaction(
        &self,
        snapshot: &Snapshot,
        tx: &Transaction,
    ) -> Result<(), AppError> {
        let (category_id, payee_id) = match &tx.transfer_account_id {
            Some(target_id) => {
                let target = snapshot
                    .account(target_id)
                    .ok_or_else(|| AppError::AccountNotFound(target_id.clone()))?;
                let payee_id = target.transfer_payee_id.clone().ok_or_else(|| {
                    AppError::Validation(format!(
                        "account {:?} has no transfer payee",
                        target.name
                    ))
                })?;
                (None, Some(payee_id))
            }
            None => (Some(tx.category_id.clone()), None),
        };

        let new_transaction = NewTransaction {
            account_id: tx.account_id.clone(),
            date: tx.date,
            amount: tx.amount,
            memo: tx.comment.clone(),
            cleared: "cleared",
            approved: true,
            category_id,
            payee_id,
        };

        self.client
            .create_transaction(&snapshot.budget_id, &new_transaction)
            .await?;
        tracing::info!(
            account_id = %tx.account_id,
            amount = %tx.amount,
            transfer = tx.is_transfer(),
            "Transaction created"
        );
        Ok(())
    }
}
