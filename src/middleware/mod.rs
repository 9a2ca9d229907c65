//! HTTP middleware components.
//!
//! Middleware are functions that run around route handlers.

/// Logging of failed requests
pub mod failures;
