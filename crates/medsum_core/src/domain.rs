//! crates/medsum_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or wire format.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Status given to every freshly uploaded document.
pub const DOCUMENT_STATUS_UPLOADED: &str = "uploaded";

/// A person who logged in with a phone number.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub phone_number: String,
    pub full_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
    /// Aggregate HTML written by the external insight generator.
    pub patient_insights: Option<String>,
}

/// A file uploaded by a user. `user_id` is fixed at creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: Uuid,
    pub user_id: Uuid,
    pub original_name: String,
    pub content_type: String,
    pub storage_path: String,
    pub extracted_markdown: Option<String>,
    pub status: String,
    pub uploaded_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Generated output for one document. Rows are written by an external
/// worker; this service only reads them.
#[derive(Debug, Clone, PartialEq)]
pub struct Insight {
    pub document_id: Uuid,
    pub user_id: Uuid,
    pub html_insights: String,
    pub status: String,
    pub details_json: Option<serde_json::Value>,
    pub error_message: Option<String>,
    pub generated_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}
