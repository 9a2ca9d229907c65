//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses. The web front-end only ever reports a generic server
//! error to the browser; the `code` in the body tells the failure kinds apart.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Application-wide error type.
///
/// # Error Categories
///
/// - **Configuration Errors**: malformed config, missing designated currency
/// - **Lookup Errors**: a budget, account, category or currency that does not exist
/// - **Validation Errors**: unparseable form input
/// - **Remote Errors**: network or HTTP failures from the budgeting API
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration is malformed or inconsistent. Fatal at startup.
    #[error("Configuration error: {0}")]
    Config(String),

    /// No remote budget carries the configured name.
    #[error("Budget named {0:?} not found")]
    BudgetNotFound(String),

    /// Account name (at fetch time) or account ID (at submission time) is unknown.
    #[error("Account {0:?} not found")]
    AccountNotFound(String),

    /// Category name (at fetch time) or category ID (at submission time) is unknown.
    #[error("Category {0:?} not found")]
    CategoryNotFound(String),

    #[error("Currency {0:?} not found")]
    CurrencyNotFound(String),

    /// Form input could not be understood.
    ///
    /// The String contains details about what was invalid.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Network or decoding failure talking to the budgeting API.
    ///
    /// Wraps any reqwest::Error through `#[from]`.
    #[error("Remote service error: {0}")]
    Remote(#[from] reqwest::Error),

    /// The budgeting API answered with a non-success status.
    #[error("Remote call {call} failed with {status}: {body}")]
    RemoteStatus {
        call: &'static str,
        status: u16,
        body: String,
    },

    /// HTML page could not be written.
    #[error("Render error: {0}")]
    Render(#[from] std::fmt::Error),
}

impl AppError {
    /// Machine-readable error code reported in the JSON body.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "config_error",
            AppError::BudgetNotFound(_)
            | AppError::AccountNotFound(_)
            | AppError::CategoryNotFound(_)
            | AppError::CurrencyNotFound(_) => "not_found",
            AppError::Validation(_) => "validation_error",
            AppError::Remote(_) | AppError::RemoteStatus { .. } => "remote_error",
            AppError::Render(_) => "internal_error",
        }
    }
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// ```json
/// {
///   "error": {
///     "code": "not_found",
///     "message": "Account \"A9\" not found"
///   }
/// }
/// ```
///
/// Every variant answers with 500 Internal Server Error. The failure is also
/// attached to the response extensions so that `middleware::failures` can log
/// it together with the request method and path.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": message
            }
        }));

        let mut response = (StatusCode::INTERNAL_SERVER_ERROR, body).into_response();
        response
            .extensions_mut()
            .insert(FailureReason(message));
        response
    }
}

/// Human-readable failure carried from an error response to the logging middleware.
#[derive(Debug, Clone)]
pub struct FailureReason(pub String);
