//! services/api/src/web/insights.rs
//!
//! Polling endpoints for generated insights. Both only read what the external
//! generator has written.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use medsum_core::service;
use std::sync::Arc;

use crate::error::ApiError;
use crate::web::documents::parse_document_id;
use crate::web::rest::{ErrorResponse, InsightResponse, PatientInsightResponse};
use crate::web::session::CurrentUser;
use crate::web::state::AppState;

/// GET /documents/{id}/insight - Poll the insight for one document
#[utoipa::path(
    get,
    path = "/documents/{id}/insight",
    params(("id" = uuid::Uuid, Path, description = "Document id")),
    responses(
        (status = 200, description = "Current insight state", body = InsightResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "No such document for this caller", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn document_insight_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<InsightResponse>, ApiError> {
    let document_id = parse_document_id(&id)?;
    let insight = service::document_insight(state.db.as_ref(), user_id, document_id).await?;
    Ok(Json(InsightResponse::new(document_id, &insight)))
}

/// GET /user/insights - Aggregate insights for the caller
#[utoipa::path(
    get,
    path = "/user/insights",
    responses(
        (status = 200, description = "Aggregate insight state", body = PatientInsightResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn patient_insights_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
) -> Result<Json<PatientInsightResponse>, ApiError> {
    let insights = service::patient_insights(state.db.as_ref(), user_id).await?;
    Ok(Json(insights.into()))
}
