//! Bearer token gate
//!
//! Token issuance lives elsewhere; this only compares the `Authorization`
//! header against the configured static token.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::handlers::AppState;
use crate::error::AppError;

/// Reject requests whose bearer token does not match the configured one
pub async fn bearer_auth(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.api_token.as_deref() else {
        return next.run(request).await;
    };

    let authorized = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(extract_bearer_token)
        .is_some_and(|token| token == expected);

    if !authorized {
        tracing::debug!(path = %request.uri().path(), "rejected request without valid token");
        return AppError::Unauthorized.into_response();
    }

    next.run(request).await
}

/// Pull the token out of a `Bearer <token>` header value
pub fn extract_bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
