//! crates/medsum_core/src/testing.rs
//!
//! In-memory implementations of the ports. Compiled for this crate's tests and
//! for dependents that enable the `testing` feature.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::{Document, Insight, User, DOCUMENT_STATUS_UPLOADED};
use crate::ports::{DatabaseService, PortError, PortResult, StorageService};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    // Insertion order doubles as upload order.
    documents: Vec<Document>,
    insights: HashMap<Uuid, Insight>,
}

/// A `DatabaseService` backed by plain vectors behind a mutex.
#[derive(Default)]
pub struct InMemoryDatabase {
    tables: Mutex<Tables>,
    insight_lookups: AtomicUsize,
}

impl InMemoryDatabase {
    pub fn user_count(&self) -> usize {
        self.lock().users.len()
    }

    /// Number of `get_insight` calls served so far.
    pub fn insight_lookups(&self) -> usize {
        self.insight_lookups.load(Ordering::SeqCst)
    }

    /// Plays the external generator writing an insight row.
    pub fn put_insight(
        &self,
        document_id: Uuid,
        status: &str,
        html: &str,
        error_message: Option<&str>,
    ) {
        let mut tables = self.lock();
        let user_id = tables
            .documents
            .iter()
            .find(|d| d.id == document_id)
            .map(|d| d.user_id)
            .unwrap_or_else(Uuid::nil);
        let now = Utc::now();
        tables.insights.insert(
            document_id,
            Insight {
                document_id,
                user_id,
                html_insights: html.to_string(),
                status: status.to_string(),
                details_json: None,
                error_message: error_message.map(str::to_string),
                generated_at: Some(now),
                updated_at: Some(now),
            },
        );
    }

    /// Plays the external generator filling the per-user aggregate.
    pub fn set_patient_insights(&self, user_id: Uuid, html: &str) {
        if let Some(user) = self.lock().users.iter_mut().find(|u| u.id == user_id) {
            user.patient_insights = Some(html.to_string());
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl DatabaseService for InMemoryDatabase {
    async fn upsert_user(&self, phone_number: &str, full_name: Option<&str>) -> PortResult<User> {
        let mut tables = self.lock();
        let now = Utc::now();
        if let Some(user) = tables.users.iter_mut().find(|u| u.phone_number == phone_number) {
            user.last_login_at = Some(now);
            return Ok(user.clone());
        }
        let user = User {
            id: Uuid::new_v4(),
            phone_number: phone_number.to_string(),
            full_name: full_name.map(str::to_string),
            created_at: now,
            last_login_at: Some(now),
            patient_insights: None,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User> {
        self.lock()
            .users
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))
    }

    async fn create_document(
        &self,
        user_id: Uuid,
        original_name: &str,
        content_type: &str,
        storage_path: &str,
    ) -> PortResult<Document> {
        let now = Utc::now();
        let doc = Document {
            id: Uuid::new_v4(),
            user_id,
            original_name: original_name.to_string(),
            content_type: content_type.to_string(),
            storage_path: storage_path.to_string(),
            extracted_markdown: None,
            status: DOCUMENT_STATUS_UPLOADED.to_string(),
            uploaded_at: now,
            updated_at: now,
        };
        self.lock().documents.push(doc.clone());
        Ok(doc)
    }

    async fn list_documents(&self, user_id: Uuid) -> PortResult<Vec<Document>> {
        Ok(self
            .lock()
            .documents
            .iter()
            .rev()
            .filter(|d| d.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn get_document(&self, document_id: Uuid, user_id: Uuid) -> PortResult<Document> {
        self.lock()
            .documents
            .iter()
            .find(|d| d.id == document_id && d.user_id == user_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Document {} not found", document_id)))
    }

    async fn delete_document(&self, document_id: Uuid, user_id: Uuid) -> PortResult<bool> {
        let mut tables = self.lock();
        let before = tables.documents.len();
        tables
            .documents
            .retain(|d| !(d.id == document_id && d.user_id == user_id));
        let removed = tables.documents.len() < before;
        if removed {
            tables.insights.remove(&document_id);
        }
        Ok(removed)
    }

    async fn get_insight(&self, document_id: Uuid) -> PortResult<Option<Insight>> {
        self.insight_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.lock().insights.get(&document_id).cloned())
    }
}

/// A `StorageService` that keeps uploads in a map keyed by locator.
#[derive(Default)]
pub struct InMemoryStorage {
    files: Mutex<HashMap<String, Vec<u8>>>,
    fail_writes: bool,
    write_delay: Option<Duration>,
}

impl InMemoryStorage {
    /// A store whose every write fails.
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    /// A store that sleeps for `delay` before every write.
    pub fn slow(delay: Duration) -> Self {
        Self {
            write_delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn read(&self, locator: &str) -> Option<Vec<u8>> {
        self.files
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(locator)
            .cloned()
    }
}

#[async_trait]
impl StorageService for InMemoryStorage {
    async fn save(&self, user_id: Uuid, original_name: &str, data: &[u8]) -> PortResult<String> {
        if let Some(delay) = self.write_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_writes {
            return Err(PortError::Unexpected("disk full".to_string()));
        }
        let locator = format!("memory://{}/{}-{}", user_id, Uuid::new_v4(), original_name);
        self.files
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(locator.clone(), data.to_vec());
        Ok(locator)
    }
}
