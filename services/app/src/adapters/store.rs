//! services/app/src/adapters/store.rs
//!
//! This module contains the local storage adapter, which is the concrete
//! implementation of the `DocumentStoreService` port from the `core` crate.
//! The whole document collection lives in one JSON file (the namespaced key)
//! and is replaced wholesale on every mutation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lecture_notes_core::domain::Document;
use lecture_notes_core::ports::{DocumentStoreService, PortError, PortResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::error;
use uuid::Uuid;

/// File name of the single collection key inside the storage directory.
const DOCUMENTS_FILE: &str = "lecture_notes_documents.json";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A storage adapter that persists the document collection to one JSON file.
///
/// Mutations are read-modify-write over the whole collection. Concurrent
/// writers are not coordinated: the last writer wins and earlier concurrent
/// writes are lost. Acceptable for a single-user local client.
#[derive(Clone)]
pub struct FileStoreAdapter {
    path: PathBuf,
}

impl FileStoreAdapter {
    /// Creates a new `FileStoreAdapter` rooted at the given storage directory.
    pub fn new(storage_dir: &Path) -> Self {
        Self {
            path: storage_dir.join(DOCUMENTS_FILE),
        }
    }

    /// Reads and deserializes the collection. Missing or corrupt data is
    /// treated as an absent collection, not a fatal fault.
    async fn read_collection(&self) -> Vec<StoredDocument> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                error!("Error loading documents: {}", e);
                return Vec::new();
            }
        };
        match serde_json::from_slice(&raw) {
            Ok(records) => records,
            Err(e) => {
                error!("Error loading documents: {}", e);
                Vec::new()
            }
        }
    }

    /// Serializes and writes the whole collection back, via a temp file and
    /// rename so readers never observe a partially written collection.
    async fn write_collection(&self, records: &[StoredDocument]) -> PortResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PortError::Storage(e.to_string()))?;
        }
        let raw =
            serde_json::to_vec_pretty(records).map_err(|e| PortError::Storage(e.to_string()))?;
        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, raw)
            .await
            .map_err(|e| PortError::Storage(e.to_string()))?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| PortError::Storage(e.to_string()))
    }
}

//=========================================================================================
// "Impure" Persisted Record Structs
//=========================================================================================

/// The on-disk shape of one document record. Field names stay camelCase so
/// the file matches the collection format the mobile client established.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredDocument {
    id: Uuid,
    name: String,
    filename: String,
    created: DateTime<Utc>,
    latex_content: String,
    pdf_available: bool,
}

impl StoredDocument {
    fn to_domain(self) -> Document {
        Document {
            id: self.id,
            name: self.name,
            filename: self.filename,
            created: self.created,
            latex_content: self.latex_content,
            pdf_available: self.pdf_available,
        }
    }

    fn from_domain(document: &Document) -> Self {
        Self {
            id: document.id,
            name: document.name.clone(),
            filename: document.filename.clone(),
            created: document.created,
            latex_content: document.latex_content.clone(),
            pdf_available: document.pdf_available,
        }
    }
}

//=========================================================================================
// `DocumentStoreService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DocumentStoreService for FileStoreAdapter {
    async fn get_documents(&self) -> Vec<Document> {
        self.read_collection()
            .await
            .into_iter()
            .map(StoredDocument::to_domain)
            .collect()
    }

    async fn save_document(&self, document: &Document) -> PortResult<()> {
        let mut records = self.read_collection().await;
        records.push(StoredDocument::from_domain(document));
        self.write_collection(&records).await.map_err(|e| {
            error!("Error saving document: {}", e);
            e
        })
    }

    async fn delete_document(&self, id: Uuid) -> PortResult<()> {
        let mut records = self.read_collection().await;
        records.retain(|record| record.id != id);
        self.write_collection(&records).await.map_err(|e| {
            error!("Error deleting document: {}", e);
            e
        })
    }

    async fn clear_all(&self) -> PortResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                error!("Error clearing documents: {}", e);
                Err(PortError::Storage(e.to_string()))
            }
        }
    }
}

//=========================================================================================
// Tests
//=========================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_document(name: &str) -> Document {
        Document {
            id: Uuid::new_v4(),
            name: name.to_string(),
            filename: name.to_lowercase().replace(' ', "_"),
            created: Utc.with_ymd_and_hms(2024, 3, 11, 9, 30, 0).unwrap(),
            latex_content: "\\section{Intro}".to_string(),
            pdf_available: true,
        }
    }

    #[tokio::test]
    async fn save_then_get_round_trips_the_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStoreAdapter::new(dir.path());

        let document = sample_document("Lecture 3");
        store.save_document(&document).await.unwrap();

        let loaded = store.get_documents().await;
        assert_eq!(loaded, vec![document]);
    }

    #[tokio::test]
    async fn missing_collection_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStoreAdapter::new(dir.path());
        assert!(store.get_documents().await.is_empty());
    }

    #[tokio::test]
    async fn corrupt_collection_reads_as_empty_and_save_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join(DOCUMENTS_FILE), b"{not json")
            .await
            .unwrap();
        let store = FileStoreAdapter::new(dir.path());

        assert!(store.get_documents().await.is_empty());

        let document = sample_document("Recovered");
        store.save_document(&document).await.unwrap();
        assert_eq!(store.get_documents().await, vec![document]);
    }

    #[tokio::test]
    async fn delete_removes_only_the_matching_record_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStoreAdapter::new(dir.path());

        let first = sample_document("First");
        let second = sample_document("Second");
        let third = sample_document("Third");
        for document in [&first, &second, &third] {
            store.save_document(document).await.unwrap();
        }

        store.delete_document(second.id).await.unwrap();
        assert_eq!(store.get_documents().await, vec![first, third]);
    }

    #[tokio::test]
    async fn clear_all_removes_the_collection() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStoreAdapter::new(dir.path());

        store.save_document(&sample_document("Gone")).await.unwrap();
        store.clear_all().await.unwrap();
        assert!(store.get_documents().await.is_empty());

        // Clearing an already-absent collection is not an error.
        store.clear_all().await.unwrap();
    }
}
