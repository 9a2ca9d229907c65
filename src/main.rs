//! Expense front-end - Main Application Entry Point
//!
//! # Startup Flow
//!
//! 1. Load server settings from environment variables
//! 2. Load the budget configuration file
//! 3. Build the currency ledger (fails on a missing designated currency)
//! 4. Register the live budget and the fixture datasets, each with its own cache
//! 5. Build the HTTP router and start serving

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use ynab_expenses::{
    config::{BudgetConfig, ServerConfig},
    models::currency::Ledger,
    services::{
        cache::{DEFAULT_TTL, SnapshotCache},
        fixtures::FixtureSource,
        ynab::{BudgetSelection, YnabClient, YnabSource},
    },
    state::{AppState, PageSettings, Sources},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Reads RUST_LOG (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let server = ServerConfig::from_env()?;
    let mut budget = BudgetConfig::load(&server.config_path)?;
    if let Some(token) = &server.ynab_token {
        budget.ynab_token = token.clone();
    }
    tracing::info!(
        path = %server.config_path,
        budget = %budget.budget_name,
        "Configuration loaded"
    );

    let ledger = Ledger::from_config(&budget)?;

    let client = YnabClient::new(
        &server.ynab_base_url,
        &budget.ynab_token,
        Duration::from_secs(server.remote_timeout_secs),
    )?;
    let live = YnabSource::new(client, BudgetSelection::from(&budget));

    let sources = Sources::new(Arc::new(SnapshotCache::new(Arc::new(live), DEFAULT_TTL)))
        .with_fixture(
            "simple",
            Arc::new(SnapshotCache::new(
                Arc::new(FixtureSource::simple()),
                DEFAULT_TTL,
            )),
        );

    let state = AppState::new(ledger, PageSettings::from(&budget), sources);
    let app = ynab_expenses::router(state);

    let listener = tokio::net::TcpListener::bind(&server.listen_addr).await?;
    tracing::info!("Server listening on {}", server.listen_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
