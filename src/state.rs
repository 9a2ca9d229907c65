//! Shared application state handed to every handler.

use std::collections::HashMap;
use std::sync::Arc;

use crate::{config::BudgetConfig, models::currency::Ledger, services::cache::SnapshotCache};

/// Page settings that do not change after startup.
#[derive(Debug, Clone, Default)]
pub struct PageSettings {
    pub title: String,
    /// Account names whose balance is not shown.
    pub hide_balance: Vec<String>,
}

impl From<&BudgetConfig> for PageSettings {
    fn from(config: &BudgetConfig) -> Self {
        PageSettings {
            title: config.page_title.clone(),
            hide_balance: config.hide_balance.clone(),
        }
    }
}

/// One cache per data source: the live budget plus named fixtures.
pub struct Sources {
    primary: Arc<SnapshotCache>,
    fixtures: HashMap<String, Arc<SnapshotCache>>,
}

impl Sources {
    pub fn new(primary: Arc<SnapshotCache>) -> Self {
        Sources {
            primary,
            fixtures: HashMap::new(),
        }
    }

    pub fn with_fixture(mut self, name: &str, cache: Arc<SnapshotCache>) -> Self {
        self.fixtures.insert(name.to_string(), cache);
        self
    }

    /// Cache for the `mock` request parameter; blank or unknown names get the primary one.
    pub fn select(&self, mock: &str) -> &Arc<SnapshotCache> {
        self.fixtures.get(mock).unwrap_or(&self.primary)
    }

    /// True when `mock` names a registered fixture.
    pub fn is_fixture(&self, mock: &str) -> bool {
        self.fixtures.contains_key(mock)
    }
}

/// State extracted by handlers with `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<Ledger>,
    pub page: Arc<PageSettings>,
    pub sources: Arc<Sources>,
}

impl AppState {
    pub fn new(ledger: Ledger, page: PageSettings, sources: Sources) -> Self {
        AppState {
            ledger: Arc::new(ledger),
            page: Arc::new(page),
            sources: Arc::new(sources),
        }
    }
}
