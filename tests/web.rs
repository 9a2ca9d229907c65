use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use http_body_util::BodyExt;
use tower::ServiceExt;

use ynab_expenses::{
    config::CurrencyConfig,
    error::AppError,
    models::{currency::Ledger, snapshot::Snapshot, transaction::Transaction},
    router,
    services::{
        DataSource,
        cache::{DEFAULT_TTL, SnapshotCache},
        fixtures::FixtureSource,
    },
    state::{AppState, PageSettings, Sources},
};

/// Stands in for an unreachable budget.
struct MissingBudget;

#[async_trait]
impl DataSource for MissingBudget {
    fn name(&self) -> &str {
        "missing"
    }

    async fn load(&self) -> Result<Snapshot, AppError> {
        Err(AppError::BudgetNotFound("Household".into()))
    }

    async fn create_transaction(
        &self,
        _snapshot: &Snapshot,
        _tx: &Transaction,
    ) -> Result<(), AppError> {
        Ok(())
    }
}

fn app() -> Router {
    let ledger = Ledger::new(
        &[
            CurrencyConfig {
                code: "USD".into(),
                rate: 1.0,
                format: "$%0.2f".into(),
            },
            CurrencyConfig {
                code: "GEL".into(),
                rate: 2.6,
                format: "₾%0.2f".into(),
            },
        ],
        "USD",
        "GEL",
        None,
    )
    .unwrap();

    let sources = Sources::new(Arc::new(SnapshotCache::new(
        Arc::new(MissingBudget),
        DEFAULT_TTL,
    )))
    .with_fixture(
        "simple",
        Arc::new(SnapshotCache::new(
            Arc::new(FixtureSource::simple()),
            DEFAULT_TTL,
        )),
    );

    let page = PageSettings {
        title: "Test Expenses".into(),
        hide_balance: Vec::new(),
    };
    router(AppState::new(ledger, page, sources))
}

async fn get(app: &Router, uri: &str) -> Response {
    app.clone()
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post_form(app: &Router, uri: &str, body: &str) -> Response {
    app.clone()
        .oneshot(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(response: &Response) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

#[tokio::test]
async fn index_renders_fixture_data() {
    let app = app();

    let response = get(&app, "/?mock=simple").await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Test Expenses"));
    assert!(html.contains("Cash"));
    assert!(html.contains("Groceries"));
    assert!(html.contains("Milk"));
}

#[tokio::test]
async fn fetch_failure_is_a_server_error() {
    let app = app();

    let response = get(&app, "/").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn entered_expense_shows_up_immediately() {
    let app = app();

    let response = post_form(
        &app,
        "/enter",
        "date=2025-01-20&category=C1&account=A1&comment=Bread+rolls&amount=10&currency=GEL&mock=simple",
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/?mock=simple");

    let html = body_text(get(&app, "/?mock=simple").await).await;
    assert!(html.contains("₾10 Bread rolls"));
    // 345.60 - 3.90
    assert!(html.contains("$341.70"));
}

#[tokio::test]
async fn entered_transfer_has_no_comment() {
    let app = app();

    let response = post_form(
        &app,
        "/enter",
        "date=2025-01-21&category=transfer-to-A3&account=A1&comment=&amount=7&currency=USD&mock=simple",
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let html = body_text(get(&app, "/?mock=simple").await).await;
    assert!(html.contains(
        "<tr><td>2025-01-21</td><td>Cash</td><td>Transfer to Alisa Business</td><td></td><td>$-7.00</td></tr>"
    ));
}

#[tokio::test]
async fn invalid_amount_is_rejected() {
    let app = app();

    let response = post_form(
        &app,
        "/enter",
        "category=C1&account=A1&amount=lots&currency=USD&mock=simple",
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["error"]["code"], "validation_error");

    let html = body_text(get(&app, "/?mock=simple").await).await;
    assert!(html.contains("$345.60"));
}

#[tokio::test]
async fn refresh_discards_local_appends() {
    let app = app();
    post_form(
        &app,
        "/enter",
        "category=C1&account=A1&comment=Temporary&amount=1&currency=USD&mock=simple",
    )
    .await;
    assert!(body_text(get(&app, "/?mock=simple").await).await.contains("Temporary"));

    let response = post_form(&app, "/refresh?mock=simple", "").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/?mock=simple");
    assert!(!body_text(get(&app, "/?mock=simple").await).await.contains("Temporary"));
}

#[tokio::test]
async fn refresh_without_fixture_returns_home() {
    let app = app();

    let response = app
        .clone()
        .oneshot(Request::post("/refresh").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}
