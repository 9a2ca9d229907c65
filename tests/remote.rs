use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::NaiveDate;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use ynab_expenses::{
    error::AppError,
    models::{
        account::Account, amount::Amount, category::Category, snapshot::Snapshot,
        transaction::Transaction,
    },
    services::{
        DataSource,
        ynab::{BudgetSelection, YnabClient, YnabSource},
    },
};

const TOKEN: &str = "secret-token";

/// In-memory budgeting API: fixed data, records created transactions.
#[derive(Default)]
struct FakeApi {
    created: Mutex<Vec<Value>>,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

fn envelope(headers: &HeaderMap, data: Value) -> Response {
    if !authorized(headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": {"id": "401", "name": "unauthorized"}})),
        )
            .into_response();
    }
    Json(json!({ "data": data })).into_response()
}

async fn budgets(headers: HeaderMap) -> Response {
    envelope(
        &headers,
        json!({"budgets": [
            {"id": "B1", "name": "Old Budget"},
            {"id": "B2", "name": "Household"}
        ]}),
    )
}

async fn accounts(headers: HeaderMap) -> Response {
    envelope(
        &headers,
        json!({"accounts": [
            {"id": "A2", "name": "Card", "balance": 125000, "deleted": false},
            {"id": "A1", "name": "Cash", "balance": 345600, "deleted": false},
            {"id": "A9", "name": "Savings", "balance": 999000, "deleted": false},
            {"id": "A0", "name": "Cash", "balance": 1000, "deleted": true}
        ]}),
    )
}

async fn payees(headers: HeaderMap) -> Response {
    envelope(
        &headers,
        json!({"payees": [
            {"id": "P1", "name": "Grocery Store", "transfer_account_id": null, "deleted": false},
            {"id": "TP-A1", "name": "Transfer : Cash", "transfer_account_id": "A1", "deleted": false},
            {"id": "TP-A2", "name": "Transfer : Card", "transfer_account_id": "A2", "deleted": false}
        ]}),
    )
}

async fn categories(headers: HeaderMap) -> Response {
    envelope(
        &headers,
        json!({"category_groups": [
            {"id": "G1", "name": "Everyday", "categories": [
                {"id": "C1", "name": "Groceries", "deleted": false},
                {"id": "C2", "name": "Dining Out", "deleted": false}
            ]},
            {"id": "G2", "name": "Bills", "categories": [
                {"id": "C3", "name": "Rent", "deleted": false}
            ]}
        ]}),
    )
}

async fn transactions(headers: HeaderMap) -> Response {
    envelope(
        &headers,
        json!({"transactions": [
            {"id": "T1", "date": "2025-01-10", "amount": -3450, "memo": "Milk",
             "account_id": "A1", "category_id": "C1", "transfer_account_id": null, "deleted": false},
            {"id": "T2", "date": "2025-01-11", "amount": -50000, "memo": null,
             "account_id": "A1", "category_id": null, "transfer_account_id": "A2", "deleted": false},
            {"id": "T3", "date": "2025-01-11", "amount": 50000, "memo": null,
             "account_id": "A2", "category_id": null, "transfer_account_id": "A1", "deleted": false},
            {"id": "T4", "date": "2025-01-12", "amount": -900000, "memo": "January",
             "account_id": "A2", "category_id": "C3", "transfer_account_id": null, "deleted": false},
            {"id": "T5", "date": "2025-01-13", "amount": -7000, "memo": "Gift",
             "account_id": "A9", "category_id": "C1", "transfer_account_id": null, "deleted": false},
            {"id": "T6", "date": "2025-01-14", "amount": -12990, "memo": "Lunch",
             "account_id": "A2", "category_id": "C2", "transfer_account_id": null, "deleted": false},
            {"id": "T7", "date": "2025-01-15", "amount": -1000, "memo": "Typo",
             "account_id": "A1", "category_id": "C1", "transfer_account_id": null, "deleted": true}
        ]}),
    )
}

async fn create(
    State(api): State<Arc<FakeApi>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if body["transaction"]["account_id"] == "A9" {
        return (StatusCode::BAD_REQUEST, "account is closed").into_response();
    }
    api.created.lock().unwrap().push(body);
    (StatusCode::CREATED, Json(json!({"data": {}}))).into_response()
}

async fn spawn_api() -> (String, Arc<FakeApi>) {
    let api = Arc::new(FakeApi::default());
    let app = Router::new()
        .route("/v1/budgets", get(budgets))
        .route("/v1/budgets/{budget_id}/accounts", get(accounts))
        .route("/v1/budgets/{budget_id}/payees", get(payees))
        .route("/v1/budgets/{budget_id}/categories", get(categories))
        .route(
            "/v1/budgets/{budget_id}/transactions",
            get(transactions).post(create),
        )
        .with_state(api.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/v1"), api)
}

fn selection(budget: &str) -> BudgetSelection {
    BudgetSelection {
        budget_name: budget.into(),
        accounts: vec!["Cash".into(), "Card".into()],
        categories: vec!["Groceries".into(), "Dining Out".into()],
    }
}

fn source(base_url: &str, token: &str, budget: &str) -> YnabSource {
    let client = YnabClient::new(base_url, token, Duration::from_secs(5)).unwrap();
    YnabSource::new(client, selection(budget))
}

fn local_snapshot() -> Snapshot {
    Snapshot::new(
        "B2",
        vec![
            Account::new("A1", "Cash", Amount::from_milliunits(345_600))
                .with_transfer_payee("TP-A1"),
            Account::new("A2", "Card", Amount::from_milliunits(125_000))
                .with_transfer_payee("TP-A2"),
            Account::new("A3", "Envelope", Amount::from_milliunits(0)),
        ],
        vec![Category::real("C1", "Groceries")],
        Vec::new(),
    )
}

fn local_tx(account: &str, category: &str, transfer: Option<&str>, amount: i64) -> Transaction {
    Transaction {
        id: "local-1".into(),
        date: NaiveDate::from_ymd_opt(2025, 1, 20).unwrap(),
        category_id: category.into(),
        account_id: account.into(),
        transfer_account_id: transfer.map(str::to_string),
        comment: "₾10 Taxi".into(),
        amount: Amount::from_milliunits(amount),
        amount_in_budget_currency: Amount::from_milliunits(amount),
    }
}

#[tokio::test]
async fn loads_configured_accounts_and_categories() {
    let (base_url, _api) = spawn_api().await;

    let snapshot = source(&base_url, TOKEN, "Household").load().await.unwrap();

    assert_eq!(snapshot.budget_id, "B2");

    let accounts: Vec<_> = snapshot
        .accounts
        .iter()
        .map(|a| (a.id.as_str(), a.name.as_str(), a.balance.milliunits()))
        .collect();
    assert_eq!(accounts, vec![("A1", "Cash", 345_600), ("A2", "Card", 125_000)]);
    assert_eq!(snapshot.accounts[1].transfer_payee_id.as_deref(), Some("TP-A2"));

    let names: Vec<_> = snapshot.all_categories.iter().map(|c| c.name()).collect();
    assert_eq!(
        names,
        vec!["Groceries", "Dining Out", "Transfer to Cash", "Transfer to Card"]
    );
}

#[tokio::test]
async fn skips_transactions_outside_the_tracked_set() {
    let (base_url, _api) = spawn_api().await;

    let snapshot = source(&base_url, TOKEN, "Household").load().await.unwrap();

    let ids: Vec<_> = snapshot.transactions.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["T1", "T2", "T6"]);

    let transfer = &snapshot.transactions[1];
    assert_eq!(transfer.category_id, "transfer-to-A2");
    assert_eq!(transfer.transfer_account_id.as_deref(), Some("A2"));
    assert_eq!(transfer.comment, "");
    assert_eq!(transfer.amount.milliunits(), -50_000);
}

#[tokio::test]
async fn unknown_budget_fails_the_fetch() {
    let (base_url, _api) = spawn_api().await;

    let result = source(&base_url, TOKEN, "Vacation").load().await;

    assert!(matches!(result, Err(AppError::BudgetNotFound(name)) if name == "Vacation"));
}

#[tokio::test]
async fn missing_configured_account_fails_the_fetch() {
    let (base_url, _api) = spawn_api().await;
    let client = YnabClient::new(&base_url, TOKEN, Duration::from_secs(5)).unwrap();
    let mut selection = selection("Household");
    selection.accounts.push("Brokerage".into());

    let result = YnabSource::new(client, selection).load().await;

    assert!(matches!(result, Err(AppError::AccountNotFound(name)) if name == "Brokerage"));
}

#[tokio::test]
async fn rejected_token_surfaces_status() {
    let (base_url, _api) = spawn_api().await;

    let result = source(&base_url, "wrong", "Household").load().await;

    match result {
        Err(AppError::RemoteStatus { call, status, body }) => {
            assert_eq!(call, "ListBudgets");
            assert_eq!(status, 401);
            assert!(body.contains("unauthorized"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn expense_is_created_with_category() {
    let (base_url, api) = spawn_api().await;
    let source = source(&base_url, TOKEN, "Household");

    source
        .create_transaction(&local_snapshot(), &local_tx("A1", "C1", None, -3_900))
        .await
        .unwrap();

    let created = api.created.lock().unwrap();
    assert_eq!(created.len(), 1);
    let tx = &created[0]["transaction"];
    assert_eq!(tx["account_id"], "A1");
    assert_eq!(tx["category_id"], "C1");
    assert!(tx["payee_id"].is_null());
    assert_eq!(tx["amount"], -3_900);
    assert_eq!(tx["date"], "2025-01-20");
    assert_eq!(tx["memo"], "₾10 Taxi");
    assert_eq!(tx["cleared"], "cleared");
    assert_eq!(tx["approved"], true);
}

#[tokio::test]
async fn transfer_is_created_with_payee() {
    let (base_url, api) = spawn_api().await;
    let source = source(&base_url, TOKEN, "Household");

    source
        .create_transaction(
            &local_snapshot(),
            &local_tx("A1", "transfer-to-A2", Some("A2"), -50_000),
        )
        .await
        .unwrap();

    let created = api.created.lock().unwrap();
    let tx = &created[0]["transaction"];
    assert_eq!(tx["payee_id"], "TP-A2");
    assert!(tx["category_id"].is_null());
    assert_eq!(tx["amount"], -50_000);
}

#[tokio::test]
async fn transfer_without_payee_is_not_sent() {
    let (base_url, api) = spawn_api().await;
    let source = source(&base_url, TOKEN, "Household");

    let result = source
        .create_transaction(
            &local_snapshot(),
            &local_tx("A1", "transfer-to-A3", Some("A3"), -1_000),
        )
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert!(api.created.lock().unwrap().is_empty());
}

#[tokio::test]
async fn rejected_create_surfaces_status() {
    let (base_url, _api) = spawn_api().await;
    let source = source(&base_url, TOKEN, "Household");
    let snapshot = Snapshot::new(
        "B2",
        vec![Account::new("A9", "Savings", Amount::from_milliunits(0))],
        vec![Category::real("C1", "Groceries")],
        Vec::new(),
    );

    let result = source
        .create_transaction(&snapshot, &local_tx("A9", "C1", None, -1_000))
        .await;

    assert!(matches!(
        result,
        Err(AppError::RemoteStatus { call: "CreateTransaction", status: 400, .. })
    ));
}
