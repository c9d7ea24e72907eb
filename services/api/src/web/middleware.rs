//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;

use crate::error::ApiError;
use crate::web::session::CurrentUser;
use crate::web::state::AppState;

/// Middleware that validates the bearer token and resolves the caller.
///
/// If valid, inserts a `CurrentUser` into request extensions for handlers to use.
/// If invalid or missing, returns 401 Unauthorized before any handler runs.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // A header that is not visible ASCII counts as malformed, not missing.
    let raw = req
        .headers()
        .get(header::AUTHORIZATION)
        .map(|value| value.to_str().unwrap_or("?"));

    let user_id = state.sessions.authenticate(raw).map_err(|e| {
        debug!("Rejected {} {}: {}", req.method(), req.uri().path(), e);
        ApiError::Unauthorized(e)
    })?;

    req.extensions_mut().insert(CurrentUser(user_id));

    Ok(next.run(req).await)
}
