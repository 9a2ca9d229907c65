//! Failed-request logging middleware.
//!
//! Handlers return `Result<_, AppError>`; the error turns into a 500
//! response carrying a [`FailureReason`]. This middleware logs that reason
//! together with the request method and path.

use axum::{extract::Request, middleware::Next, response::Response};

use crate::error::FailureReason;

/// Log every response that carries a [`FailureReason`].
///
/// # Flow
///
/// 1. Remember method and path of the incoming request
/// 2. Run the next middleware/handler
/// 3. If the response carries a failure, log it at `warn`
pub async fn log_failures(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    if let Some(FailureReason(reason)) = response.extensions().get::<FailureReason>() {
        tracing::warn!(%method, %path, status = response.status().as_u16(), "{reason}");
    }

    response
}
