//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use medsum_core::domain::{Document, Insight, User};
use medsum_core::ports::{DatabaseService, PortError, PortResult};
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::error::ApiError;

const CONNECT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);
const IDLE_TIMEOUT: Duration = Duration::from_secs(60);

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Builds the pool and checks connectivity within a bounded time.
    pub async fn connect(config: &Config) -> Result<Self, ApiError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .min_connections(1)
            .acquire_timeout(config.request_timeout)
            .idle_timeout(IDLE_TIMEOUT)
            .connect_lazy(&config.database_url)?;

        tokio::time::timeout(CONNECT_PROBE_TIMEOUT, sqlx::query("SELECT 1").execute(&pool))
            .await
            .map_err(|_| {
                ApiError::Internal(format!(
                    "database did not answer within {:?}",
                    CONNECT_PROBE_TIMEOUT
                ))
            })??;
        info!("Database connection verified.");

        Ok(Self::new(pool))
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    phone_number: String,
    full_name: Option<String>,
    created_at: DateTime<Utc>,
    last_login_at: Option<DateTime<Utc>>,
    patient_insights: Option<String>,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            phone_number: self.phone_number,
            full_name: self.full_name,
            created_at: self.created_at,
            last_login_at: self.last_login_at,
            patient_insights: self.patient_insights,
        }
    }
}

#[derive(FromRow)]
struct DocumentRecord {
    id: Uuid,
    user_id: Uuid,
    original_name: String,
    content_type: String,
    storage_path: String,
    extracted_markdown: Option<String>,
    status: String,
    uploaded_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl DocumentRecord {
    fn to_domain(self) -> Document {
        Document {
            id: self.id,
            user_id: self.user_id,
            original_name: self.original_name,
            content_type: self.content_type,
            storage_path: self.storage_path,
            extracted_markdown: self.extracted_markdown,
            status: self.status,
            uploaded_at: self.uploaded_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
struct InsightRecord {
    document_id: Uuid,
    user_id: Uuid,
    html_insights: Option<String>,
    status: String,
    details_json: Option<serde_json::Value>,
    error_message: Option<String>,
    generated_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}
impl InsightRecord {
    fn to_domain(self) -> Insight {
        Insight {
            document_id: self.document_id,
            user_id: self.user_id,
            html_insights: self.html_insights.unwrap_or_default(),
            status: self.status,
            details_json: self.details_json,
            error_message: self.error_message,
            generated_at: self.generated_at,
            updated_at: self.updated_at,
        }
    }
}

const USER_COLUMNS: &str =
    "id, phone_number, full_name, created_at, last_login_at, patient_insights";
const DOCUMENT_COLUMNS: &str = "id, user_id, original_name, content_type, storage_path, \
     extracted_markdown, status, uploaded_at, updated_at";

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn upsert_user(&self, phone_number: &str, full_name: Option<&str>) -> PortResult<User> {
        // The conflict branch only refreshes last_login_at.
        let sql = format!(
            "INSERT INTO users (phone_number, full_name, last_login_at) VALUES ($1, $2, NOW()) \
             ON CONFLICT (phone_number) DO UPDATE SET last_login_at = EXCLUDED.last_login_at \
             RETURNING {USER_COLUMNS}"
        );
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(phone_number)
            .bind(full_name)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))?;
        Ok(record.to_domain())
    }

    async fn create_document(
        &self,
        user_id: Uuid,
        original_name: &str,
        content_type: &str,
        storage_path: &str,
    ) -> PortResult<Document> {
        let sql = format!(
            "INSERT INTO documents (user_id, original_name, content_type, storage_path, status) \
             VALUES ($1, $2, $3, $4, 'uploaded') RETURNING {DOCUMENT_COLUMNS}"
        );
        let record = sqlx::query_as::<_, DocumentRecord>(&sql)
            .bind(user_id)
            .bind(original_name)
            .bind(content_type)
            .bind(storage_path)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn list_documents(&self, user_id: Uuid) -> PortResult<Vec<Document>> {
        let sql = format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE user_id = $1 \
             ORDER BY uploaded_at DESC, id DESC"
        );
        let records = sqlx::query_as::<_, DocumentRecord>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;

        let docs = records.into_iter().map(|r| r.to_domain()).collect();
        Ok(docs)
    }

    async fn get_document(&self, document_id: Uuid, user_id: Uuid) -> PortResult<Document> {
        let sql =
            format!("SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = $1 AND user_id = $2");
        let record = sqlx::query_as::<_, DocumentRecord>(&sql)
            .bind(document_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?
            .ok_or_else(|| PortError::NotFound(format!("Document {} not found", document_id)))?;
        Ok(record.to_domain())
    }

    async fn delete_document(&self, document_id: Uuid, user_id: Uuid) -> PortResult<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1 AND user_id = $2")
            .bind(document_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_insight(&self, document_id: Uuid) -> PortResult<Option<Insight>> {
        let record = sqlx::query_as::<_, InsightRecord>(
            "SELECT document_id, user_id, html_insights, status, details_json, error_message, \
             generated_at, updated_at FROM insights WHERE document_id = $1",
        )
        .bind(document_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(InsightRecord::to_domain))
    }
}
