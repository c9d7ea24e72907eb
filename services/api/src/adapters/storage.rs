//! services/api/src/adapters/storage.rs
//!
//! Local-disk implementation of the `StorageService` port. Good enough for
//! development; nothing here is replicated or fsynced.

use async_trait::async_trait;
use medsum_core::ports::{PortError, PortResult, StorageService};
use std::path::PathBuf;
use tracing::error;
use uuid::Uuid;

#[derive(Clone)]
pub struct LocalDiskStorage {
    root: PathBuf,
}

impl LocalDiskStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

/// Keeps letters, digits, `.`, `-` and `_`; everything else becomes `_`.
fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

#[async_trait]
impl StorageService for LocalDiskStorage {
    async fn save(&self, user_id: Uuid, original_name: &str, data: &[u8]) -> PortResult<String> {
        let dir = self.root.join(user_id.to_string());
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            error!("Failed to create upload directory {}: {}", dir.display(), e);
            PortError::Unexpected(e.to_string())
        })?;

        let path = dir.join(format!("{}-{}", Uuid::new_v4(), sanitize_file_name(original_name)));
        tokio::fs::write(&path, data).await.map_err(|e| {
            error!("Failed to write upload {}: {}", path.display(), e);
            PortError::Unexpected(e.to_string())
        })?;

        Ok(path.to_string_lossy().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_cannot_escape_the_user_directory() {
        assert_eq!(sanitize_file_name("report.pdf"), "report.pdf");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\docs\\scan 1.png"), "scan_1.png");
        assert_eq!(sanitize_file_name(".."), "upload");
        assert_eq!(sanitize_file_name(""), "upload");
    }

    #[tokio::test]
    async fn same_name_twice_gets_two_files() {
        let root = std::env::temp_dir().join(format!("medsum-storage-{}", Uuid::new_v4()));
        let storage = LocalDiskStorage::new(&root);
        let user_id = Uuid::new_v4();

        let first = storage.save(user_id, "report.pdf", b"one").await.unwrap();
        let second = storage.save(user_id, "report.pdf", b"two").await.unwrap();

        assert_ne!(first, second);
        assert!(first.starts_with(&*root.join(user_id.to_string()).to_string_lossy()));
        assert_eq!(tokio::fs::read(&first).await.unwrap(), b"one");
        assert_eq!(tokio::fs::read(&second).await.unwrap(), b"two");

        tokio::fs::remove_dir_all(&root).await.unwrap();
    }
}
