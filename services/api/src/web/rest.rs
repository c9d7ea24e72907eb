//! services/api/src/web/rest.rs
//!
//! Wire payloads shared by the REST handlers and the master definition for
//! the OpenAPI specification.

use chrono::{DateTime, Utc};
use medsum_core::domain::{Document, User};
use medsum_core::insight::{InsightState, PatientInsightState};
use serde::{Deserialize, Serialize};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi, ToSchema,
};
use uuid::Uuid;

use crate::web::{auth, documents, health, insights};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_handler,
        auth::login_handler,
        documents::upload_document_handler,
        documents::list_documents_handler,
        documents::get_document_handler,
        documents::delete_document_handler,
        insights::document_insight_handler,
        insights::patient_insights_handler,
    ),
    components(
        schemas(
            LoginRequest,
            LoginResponse,
            UserResponse,
            DocumentResponse,
            InsightResponse,
            PatientInsightResponse,
            ErrorResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "MedSum API", description = "Phone login, document uploads and insight polling.")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

//=========================================================================================
// API Request and Response Structs
//=========================================================================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub phone_number: String,
    pub full_name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

/// A user as seen by its owner. The aggregate insights blob has its own endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub phone_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            phone_number: user.phone_number,
            full_name: user.full_name,
            created_at: user.created_at,
            last_login_at: user.last_login_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DocumentResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub original_name: String,
    pub content_type: String,
    pub storage_path: String,
    pub extracted_markdown: String,
    pub status: String,
    pub uploaded_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Document> for DocumentResponse {
    fn from(doc: Document) -> Self {
        Self {
            id: doc.id,
            user_id: doc.user_id,
            original_name: doc.original_name,
            content_type: doc.content_type,
            storage_path: doc.storage_path,
            extracted_markdown: doc.extracted_markdown.unwrap_or_default(),
            status: doc.status,
            uploaded_at: doc.uploaded_at,
            updated_at: doc.updated_at,
        }
    }
}

/// One poll of a document's insight: `processing`, `completed`, `failed`,
/// or an extension status passed through as stored.
#[derive(Debug, Serialize, ToSchema)]
pub struct InsightResponse {
    pub document_id: Uuid,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insights_html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl InsightResponse {
    pub fn new(document_id: Uuid, state: &InsightState) -> Self {
        Self {
            document_id,
            status: state.status().to_string(),
            insights_html: state.html().map(str::to_string),
            error_message: state.error_message().map(str::to_string),
        }
    }
}

/// The per-user aggregate: `completed` or `none`.
#[derive(Debug, Serialize, ToSchema)]
pub struct PatientInsightResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insights_html: Option<String>,
}

impl From<PatientInsightState> for PatientInsightResponse {
    fn from(state: PatientInsightState) -> Self {
        let status = state.status().to_string();
        let insights_html = match state {
            PatientInsightState::Completed { html } => Some(html),
            PatientInsightState::None => None,
        };
        Self {
            status,
            insights_html,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}
