//! services/app/src/catalog.rs
//!
//! A read-through view over the local document store, backing the list and
//! detail screens. Reloads on focus; deletion is confirmed before it touches
//! the store.

use lecture_notes_core::domain::Document;
use lecture_notes_core::ports::{DocumentStoreService, InteractionService};
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

/// The catalog of locally persisted documents, in insertion order.
pub struct DocumentCatalog {
    store: Arc<dyn DocumentStoreService>,
    documents: Vec<Document>,
}

impl DocumentCatalog {
    /// Creates an empty catalog; call `refresh` to load the collection.
    pub fn new(store: Arc<dyn DocumentStoreService>) -> Self {
        Self {
            store,
            documents: Vec::new(),
        }
    }

    /// The currently loaded snapshot.
    pub fn list(&self) -> &[Document] {
        &self.documents
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Document> {
        self.documents.get(index)
    }

    /// Reloads the snapshot from the store, as happens on every focus event.
    pub async fn refresh(&mut self) {
        self.documents = self.store.get_documents().await;
    }

    /// Deletes a document after user confirmation. On success the snapshot is
    /// refreshed; on failure the displayed state is left untouched and a
    /// generic error is surfaced. Returns whether a deletion happened.
    pub async fn delete(&mut self, id: Uuid, ui: &dyn InteractionService) -> bool {
        let Some(document) = self.documents.iter().find(|d| d.id == id) else {
            return false;
        };
        let confirmed = ui
            .confirm(
                "Delete Document",
                &format!("Are you sure you want to delete \"{}\"?", document.name),
            )
            .await;
        if !confirmed {
            return false;
        }

        match self.store.delete_document(id).await {
            Ok(()) => {
                self.refresh().await;
                true
            }
            Err(e) => {
                error!("Failed to delete document {}: {}", id, e);
                ui.notify("Error", "Failed to delete document");
                false
            }
        }
    }
}

//=========================================================================================
// Tests
//=========================================================================================
