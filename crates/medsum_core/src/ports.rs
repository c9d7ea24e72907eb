//! crates/medsum_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or disks.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Document, Insight, User};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, disk).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    Invalid(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Persistence for users, documents and insights.
///
/// Every document operation takes the caller's resolved user id. Implementations
/// must filter on it in the same statement that touches the row, so a document
/// owned by someone else behaves exactly like one that does not exist.
#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- User Management ---

    /// Inserts a user for `phone_number`, or refreshes `last_login_at` on the
    /// existing one. The update path leaves `full_name` and
    /// `patient_insights` untouched.
    async fn upsert_user(&self, phone_number: &str, full_name: Option<&str>) -> PortResult<User>;

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User>;

    // --- Document Management ---

    async fn create_document(
        &self,
        user_id: Uuid,
        original_name: &str,
        content_type: &str,
        storage_path: &str,
    ) -> PortResult<Document>;

    /// Newest upload first. An empty vector when the user owns nothing.
    async fn list_documents(&self, user_id: Uuid) -> PortResult<Vec<Document>>;

    /// `NotFound` both when the row is absent and when it belongs to another user.
    async fn get_document(&self, document_id: Uuid, user_id: Uuid) -> PortResult<Document>;

    /// Returns whether a row owned by `user_id` was removed.
    async fn delete_document(&self, document_id: Uuid, user_id: Uuid) -> PortResult<bool>;

    // --- Insights ---

    /// Looked up by document alone; callers check document ownership first.
    async fn get_insight(&self, document_id: Uuid) -> PortResult<Option<Insight>>;
}

#[async_trait]
pub trait StorageService: Send + Sync {
    /// Persists the raw bytes of an upload and returns an opaque locator for them.
    async fn save(&self, user_id: Uuid, original_name: &str, data: &[u8]) -> PortResult<String>;
}
