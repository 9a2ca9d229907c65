//! Application configuration management.
//!
//! Two layers:
//! - [`ServerConfig`] comes from environment variables through the `envy` crate.
//! - [`BudgetConfig`] is a JSON file describing which budget, accounts,
//!   categories and currencies to show. The file may carry `//` and `/* */`
//!   comments and trailing commas; they are removed before parsing.

use std::path::Path;

use serde::Deserialize;

use crate::error::AppError;

/// Process-level settings loaded from environment variables.
///
/// # Environment Variables
///
/// - `LISTEN_ADDR` (optional): HTTP listen address, defaults to `0.0.0.0:3000`
/// - `CONFIG_PATH` (optional): budget configuration file, defaults to `config.json`
/// - `YNAB_TOKEN` (optional): overrides the token stored in the configuration file
/// - `YNAB_BASE_URL` (optional): budgeting API root, defaults to the public endpoint
/// - `REMOTE_TIMEOUT_SECS` (optional): per-call timeout for the budgeting API, defaults to 30
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    #[serde(default = "default_config_path")]
    pub config_path: String,

    pub ynab_token: Option<String>,

    #[serde(default = "default_base_url")]
    pub ynab_base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub remote_timeout_secs: u64,
}

fn default_listen_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_config_path() -> String {
    "config.json".to_string()
}

fn default_base_url() -> String {
    "https://api.youneedabudget.com/v1/".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file is read first when present.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed into its expected type.
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env::<ServerConfig>()
    }
}

/// One configured currency.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrencyConfig {
    pub code: String,
    /// Units of this currency per one unit of the budget currency.
    pub rate: f64,
    /// Display template, e.g. `"₾%0.2f"`.
    pub format: String,
}

/// What to show and how, loaded once at startup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BudgetConfig {
    #[serde(rename = "ynabToken", default)]
    pub ynab_token: String,

    #[serde(rename = "budget", default)]
    pub budget_name: String,

    #[serde(default)]
    pub page_title: String,

    /// Category names to track, in display order.
    #[serde(default)]
    pub categories: Vec<String>,

    /// Account names to track, in display order.
    #[serde(default)]
    pub accounts: Vec<String>,

    /// Account names whose balance is not shown.
    #[serde(default)]
    pub hide_balance: Vec<String>,

    #[serde(default)]
    pub currencies: Vec<CurrencyConfig>,

    pub budget_currency: String,

    pub default_currency: String,

    #[serde(default)]
    pub secondary_currency: String,
}

impl BudgetConfig {
    /// Parse a configuration document.
    pub fn from_json(text: &str) -> Result<Self, AppError> {
        serde_json::from_str(&relax_json(text))
            .map_err(|e| AppError::Config(format!("invalid config: {e}")))
    }

    /// Read and parse the configuration file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json(&text)
    }
}

/// Strip comments and trailing commas, leaving string contents alone.
///
/// Newlines inside comments are kept so parse errors point at the right line.
fn relax_json(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '/' if chars.peek() == Some(&'/') => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    if next == '\n' {
                        out.push('\n');
                    }
                    prev = next;
                }
                out.push(' ');
            }
            '}' | ']' => {
                let end = out.trim_end().len();
                if out[..end].ends_with(',') {
                    out.remove(end - 1);
                }
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}
