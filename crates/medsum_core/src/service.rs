//! crates/medsum_core/src/service.rs
//!
//! Use cases shared by every transport. The caller's user id is always an
//! explicit argument; nothing here trusts an owner supplied by the client.

use uuid::Uuid;

use crate::domain::{Document, User};
use crate::insight::{InsightState, PatientInsightState};
use crate::ports::{DatabaseService, PortError, PortResult, StorageService};

/// Finds or creates the user for `phone_number`.
pub async fn login(
    db: &dyn DatabaseService,
    phone_number: &str,
    full_name: Option<&str>,
) -> PortResult<User> {
    if phone_number.trim().is_empty() {
        return Err(PortError::Invalid("phone_number is required".to_string()));
    }
    db.upsert_user(phone_number, full_name).await
}

/// Writes the bytes first and records the document only once they are stored.
pub async fn upload_document(
    db: &dyn DatabaseService,
    storage: &dyn StorageService,
    user_id: Uuid,
    original_name: &str,
    content_type: &str,
    data: &[u8],
) -> PortResult<Document> {
    let storage_path = storage.save(user_id, original_name, data).await?;
    db.create_document(user_id, original_name, content_type, &storage_path)
        .await
}

/// Absent and foreign documents both come back as `NotFound`.
pub async fn delete_document(
    db: &dyn DatabaseService,
    user_id: Uuid,
    document_id: Uuid,
) -> PortResult<()> {
    if db.delete_document(document_id, user_id).await? {
        Ok(())
    } else {
        Err(PortError::NotFound(format!("Document {} not found", document_id)))
    }
}

/// Ownership is checked before the insight table is consulted, so a foreign
/// document never reveals whether it has an insight.
pub async fn document_insight(
    db: &dyn DatabaseService,
    user_id: Uuid,
    document_id: Uuid,
) -> PortResult<InsightState> {
    db.get_document(document_id, user_id).await?;
    let row = db.get_insight(document_id).await?;
    Ok(InsightState::from_row(row))
}

pub async fn patient_insights(
    db: &dyn DatabaseService,
    user_id: Uuid,
) -> PortResult<PatientInsightState> {
    let user = db.get_user_by_id(user_id).await?;
    Ok(PatientInsightState::from_blob(user.patient_insights))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{InMemoryDatabase, InMemoryStorage};

    #[tokio::test]
    async fn login_rejects_blank_phone() {
        let db = InMemoryDatabase::default();
        let err = login(&db, "   ", None).await.unwrap_err();
        assert!(matches!(err, PortError::Invalid(_)));
        assert_eq!(db.user_count(), 0);
    }

    #[tokio::test]
    async fn repeated_login_keeps_identity_and_name() {
        let db = InMemoryDatabase::default();
        let first = login(&db, "+15551234567", Some("Ada")).await.unwrap();
        let second = login(&db, "+15551234567", Some("Someone Else")).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.full_name.as_deref(), Some("Ada"));
        assert!(second.last_login_at >= first.last_login_at);
        assert_eq!(db.user_count(), 1);
    }

    #[tokio::test]
    async fn failed_write_leaves_no_document_row() {
        let db = InMemoryDatabase::default();
        let storage = InMemoryStorage::failing();
        let user = login(&db, "+15550000001", None).await.unwrap();

        let err = upload_document(&db, &storage, user.id, "scan.png", "image/png", b"bytes")
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::Unexpected(_)));
        assert!(db.list_documents(user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn upload_records_locator_and_owner() {
        let db = InMemoryDatabase::default();
        let storage = InMemoryStorage::default();
        let user = login(&db, "+15550000002", None).await.unwrap();

        let doc = upload_document(&db, &storage, user.id, "report.pdf", "application/pdf", b"%PDF")
            .await
            .unwrap();
        assert_eq!(doc.user_id, user.id);
        assert_eq!(doc.status, "uploaded");
        assert_eq!(storage.read(&doc.storage_path).as_deref(), Some(&b"%PDF"[..]));
    }

    #[tokio::test]
    async fn delete_twice_reports_not_found() {
        let db = InMemoryDatabase::default();
        let storage = InMemoryStorage::default();
        let user = login(&db, "+15550000003", None).await.unwrap();
        let doc = upload_document(&db, &storage, user.id, "a.txt", "text/plain", b"a")
            .await
            .unwrap();

        delete_document(&db, user.id, doc.id).await.unwrap();
        let err = delete_document(&db, user.id, doc.id).await.unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
    }

    #[tokio::test]
    async fn foreign_document_hides_its_insight() {
        let db = InMemoryDatabase::default();
        let storage = InMemoryStorage::default();
        let owner = login(&db, "+15550000004", None).await.unwrap();
        let other = login(&db, "+15550000005", None).await.unwrap();
        let doc = upload_document(&db, &storage, owner.id, "a.txt", "text/plain", b"a")
            .await
            .unwrap();
        db.put_insight(doc.id, "completed", "<p>secret</p>", None);

        let err = document_insight(&db, other.id, doc.id).await.unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
        assert_eq!(db.insight_lookups(), 0);

        let state = document_insight(&db, owner.id, doc.id).await.unwrap();
        assert_eq!(state.html(), Some("<p>secret</p>"));
        assert_eq!(db.insight_lookups(), 1);
    }

    #[tokio::test]
    async fn patient_insights_read_the_user_blob() {
        let db = InMemoryDatabase::default();
        let user = login(&db, "+15550000006", None).await.unwrap();
        assert_eq!(patient_insights(&db, user.id).await.unwrap(), PatientInsightState::None);

        db.set_patient_insights(user.id, "<p>overall</p>");
        let state = patient_insights(&db, user.id).await.unwrap();
        assert_eq!(state.html(), Some("<p>overall</p>"));
    }
}
