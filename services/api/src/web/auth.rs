//! services/api/src/web/auth.rs
//!
//! Phone-number login: find or create the user and hand back a session token.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use medsum_core::service;
use std::sync::Arc;
use tracing::{error, info};

use crate::error::ApiError;
use crate::web::rest::{ErrorResponse, LoginRequest, LoginResponse};
use crate::web::state::AppState;

/// POST /login - Log in (or sign up) with a phone number
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Missing phone number or invalid JSON", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(req) = payload.map_err(|_| ApiError::Validation("invalid JSON body".to_string()))?;

    // 1. Find or create the user
    let user = service::login(state.db.as_ref(), &req.phone_number, req.full_name.as_deref())
        .await?;

    // 2. Sign a fresh token for it
    let token = state.sessions.issue_token(user.id).map_err(|e| {
        error!("Failed to sign token for user {}: {:?}", user.id, e);
        ApiError::Internal("token signing failed".to_string())
    })?;

    info!("User {} logged in", user.id);
    Ok(Json(LoginResponse {
        token,
        user: user.into(),
    }))
}
