//! services/api/src/web/documents.rs
//!
//! Upload, list, fetch and delete documents owned by the caller.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    http::StatusCode,
    Extension, Json,
};
use medsum_core::service;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::rest::{DocumentResponse, ErrorResponse};
use crate::web::session::CurrentUser;
use crate::web::state::AppState;

const FILE_FIELD: &str = "file";

/// A path id that is not a UUID cannot name a document the caller owns.
pub(crate) fn parse_document_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound)
}

/// POST /documents - Upload a document
///
/// Accepts a multipart/form-data request; only the `file` part is read.
#[utoipa::path(
    post,
    path = "/documents",
    request_body(
        content_type = "multipart/form-data",
        description = "The document to upload, in a part named `file`."
    ),
    responses(
        (status = 201, description = "Document stored", body = DocumentResponse),
        (status = 400, description = "Missing file or unreadable form", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Storage or database failure", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn upload_document_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<DocumentResponse>), ApiError> {
    let mut multipart = multipart.map_err(|e| {
        warn!("Rejected upload from {}: {}", user_id, e);
        ApiError::Validation("failed to parse form".to_string())
    })?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        warn!("Unreadable multipart body from {}: {}", user_id, e);
        ApiError::Validation("failed to parse form".to_string())
    })? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or(FILE_FIELD).to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field.bytes().await.map_err(|e| {
            warn!("Failed to read upload bytes from {}: {}", user_id, e);
            ApiError::Validation("failed to parse form".to_string())
        })?;
        upload = Some((file_name, content_type, data));
        break;
    }

    let (file_name, content_type, data) =
        upload.ok_or_else(|| ApiError::Validation("file field is required".to_string()))?;

    let doc = service::upload_document(
        state.db.as_ref(),
        state.storage.as_ref(),
        user_id,
        &file_name,
        &content_type,
        &data,
    )
    .await
    .map_err(|e| {
        error!("Failed to store upload '{}' for {}: {:?}", file_name, user_id, e);
        ApiError::from(e)
    })?;

    info!("Stored document {} ({} bytes) for {}", doc.id, data.len(), user_id);
    Ok((StatusCode::CREATED, Json(doc.into())))
}

/// GET /documents - List the caller's documents, newest first
#[utoipa::path(
    get,
    path = "/documents",
    responses(
        (status = 200, description = "Documents owned by the caller", body = [DocumentResponse]),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn list_documents_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
) -> Result<Json<Vec<DocumentResponse>>, ApiError> {
    let docs = state.db.list_documents(user_id).await?;
    Ok(Json(docs.into_iter().map(DocumentResponse::from).collect()))
}

/// GET /documents/{id} - Fetch one of the caller's documents
#[utoipa::path(
    get,
    path = "/documents/{id}",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (status = 200, description = "The document", body = DocumentResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "No such document for this caller", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn get_document_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let document_id = parse_document_id(&id)?;
    let doc = state.db.get_document(document_id, user_id).await?;
    Ok(Json(doc.into()))
}

/// DELETE /documents/{id} - Delete one of the caller's documents
#[utoipa::path(
    delete,
    path = "/documents/{id}",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "No such document for this caller", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn delete_document_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let document_id = parse_document_id(&id)?;
    service::delete_document(state.db.as_ref(), user_id, document_id).await?;
    info!("Deleted document {} for {}", document_id, user_id);
    Ok(StatusCode::NO_CONTENT)
}
