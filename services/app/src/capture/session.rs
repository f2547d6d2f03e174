//! services/app/src/capture/session.rs
//!
//! Defines the capture session: the in-progress set of photos and the name
//! for the document being created, together with the submit/cancel protocol.
//! One session produces at most one persisted document.

use chrono::Utc;
use lecture_notes_core::domain::{Document, PhotoRef};
use lecture_notes_core::ports::{BackendService, DocumentStoreService, PortError, PortResult};
use tracing::{info, warn};
use uuid::Uuid;

//=========================================================================================
// Session Phases
//=========================================================================================

/// An enum representing where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapturePhase {
    /// No document creation in progress.
    Idle,
    /// Waiting for a valid document name.
    Naming,
    /// Accumulating photos; submit becomes possible once one exists.
    Capturing,
    /// An upload is in flight. A second submit is refused here.
    Submitting,
}

//=========================================================================================
// CaptureSession
//=========================================================================================

/// The ephemeral accumulator for one document-creation attempt.
///
/// Created when the capture screen gains focus and discarded on cancel,
/// successful submit, or navigation away. Never persisted.
pub struct CaptureSession {
    document_name: String,
    photos: Vec<PhotoRef>,
    phase: CapturePhase,
}

impl Default for CaptureSession {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureSession {
    /// Creates a fresh session waiting for a name.
    pub fn new() -> Self {
        Self {
            document_name: String::new(),
            photos: Vec::new(),
            phase: CapturePhase::Naming,
        }
    }

    pub fn phase(&self) -> CapturePhase {
        self.phase
    }

    pub fn document_name(&self) -> &str {
        &self.document_name
    }

    /// The surviving photos in original insertion order.
    pub fn photos(&self) -> &[PhotoRef] {
        &self.photos
    }

    pub fn photo_count(&self) -> usize {
        self.photos.len()
    }

    /// Accepts a non-empty trimmed name and moves the session to capturing.
    /// An empty or whitespace-only name is a validation error and leaves the
    /// session unchanged.
    pub fn start(&mut self, name: &str) -> PortResult<()> {
        if self.phase == CapturePhase::Submitting {
            return Err(PortError::Validation(
                "A submission is already in progress".to_string(),
            ));
        }
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(PortError::Validation(
                "Please enter a document name".to_string(),
            ));
        }
        self.document_name = trimmed.to_string();
        self.phase = CapturePhase::Capturing;
        Ok(())
    }

    /// Appends a photo to the end of the sequence. No upper bound is
    /// enforced. Returns the new count for the on-screen indicator.
    pub fn add_photo(&mut self, photo: PhotoRef) -> PortResult<usize> {
        if self.phase != CapturePhase::Capturing {
            return Err(PortError::Validation(
                "Start a document before adding photos".to_string(),
            ));
        }
        self.photos.push(photo);
        Ok(self.photos.len())
    }

    /// Removes the photo at `index`, preserving the order of the rest.
    /// Returns the remaining count; a gallery view showing the photos closes
    /// when it reaches zero.
    pub fn remove_photo(&mut self, index: usize) -> PortResult<usize> {
        if self.phase == CapturePhase::Submitting {
            return Err(PortError::Validation(
                "A submission is already in progress".to_string(),
            ));
        }
        if index >= self.photos.len() {
            return Err(PortError::Validation(format!(
                "No photo at position {}",
                index + 1
            )));
        }
        self.photos.remove(index);
        Ok(self.photos.len())
    }

    /// Uploads the photo sequence and, on success, persists exactly one new
    /// document record and clears the session.
    ///
    /// With zero photos this fails before any network call. While an upload
    /// is in flight a second invocation is refused, so duplicate uploads are
    /// impossible. On backend or storage failure the photo sequence and name
    /// are left exactly as they were, so a retry costs no rework.
    pub async fn submit(
        &mut self,
        backend: &dyn BackendService,
        store: &dyn DocumentStoreService,
    ) -> PortResult<Document> {
        if self.phase == CapturePhase::Submitting {
            warn!("Duplicate submit ignored; upload already in flight");
            return Err(PortError::Validation(
                "A submission is already in progress".to_string(),
            ));
        }
        if self.photos.is_empty() {
            return Err(PortError::Validation(
                "Please take at least one photo".to_string(),
            ));
        }

        self.phase = CapturePhase::Submitting;
        info!(
            name = %self.document_name,
            photos = self.photos.len(),
            "submitting capture session"
        );

        let conversion = match backend.upload_photos(&self.photos).await {
            Ok(conversion) => conversion,
            Err(e) => {
                // Keep photos and name so the user can retry without re-capturing.
                self.phase = CapturePhase::Capturing;
                return Err(e);
            }
        };

        let document = Document {
            id: Uuid::new_v4(),
            name: self.document_name.clone(),
            filename: conversion
                .note_name
                .unwrap_or_else(|| self.document_name.clone()),
            created: Utc::now(),
            latex_content: conversion.latex,
            pdf_available: conversion.has_pdf,
        };

        if let Err(e) = store.save_document(&document).await {
            self.phase = CapturePhase::Capturing;
            return Err(e);
        }

        info!(id = %document.id, filename = %document.filename, "document created");
        self.clear();
        Ok(document)
    }

    /// Discards all photos and the name unconditionally. The two-step
    /// confirmation before getting here belongs to the driving flow.
    pub fn cancel(&mut self) {
        self.clear();
    }

    /// Empties the session, as happens on every screen-focus event.
    pub fn reset(&mut self) {
        self.clear();
        self.phase = CapturePhase::Naming;
    }

    fn clear(&mut self) {
        self.document_name.clear();
        self.photos.clear();
        self.phase = CapturePhase::Idle;
    }
}

//=========================================================================================
// Tests
//=========================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use lecture_notes_core::domain::{ChatReply, HealthReport, NoteConversion};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// A scripted backend that counts upload calls.
    struct MockBackend {
        upload_calls: AtomicUsize,
        upload_result: Mutex<Option<PortResult<NoteConversion>>>,
    }

    impl MockBackend {
        fn returning(result: PortResult<NoteConversion>) -> Self {
            Self {
                upload_calls: AtomicUsize::new(0),
                upload_result: Mutex::new(Some(result)),
            }
        }

        fn upload_calls(&self) -> usize {
            self.upload_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl BackendService for MockBackend {
        async fn upload_photos(&self, _photos: &[PhotoRef]) -> PortResult<NoteConversion> {
            self.upload_calls.fetch_add(1, Ordering::SeqCst);
            self.upload_result
                .lock()
                .unwrap()
                .take()
                .expect("unscripted upload call")
        }

        async fn send_chat_message(&self, _: &str, _: bool) -> PortResult<ChatReply> {
            unimplemented!("not exercised")
        }

        async fn download_latex(&self, _: &str) -> PortResult<String> {
            unimplemented!("not exercised")
        }

        async fn preview_pdf(&self, _: &str) -> PortResult<Bytes> {
            unimplemented!("not exercised")
        }

        async fn delete_note(&self, _: &str) -> PortResult<()> {
            unimplemented!("not exercised")
        }

        async fn get_history(&self) -> PortResult<Vec<String>> {
            unimplemented!("not exercised")
        }

        async fn check_connection(&self) -> bool {
            true
        }

        async fn check_health(&self) -> PortResult<HealthReport> {
            unimplemented!("not exercised")
        }
    }

    /// An in-memory stand-in for the document store.
    #[derive(Default)]
    struct MemoryStore {
        documents: Mutex<Vec<Document>>,
        fail_saves: bool,
    }

    impl MemoryStore {
        fn failing() -> Self {
            Self {
                documents: Mutex::new(Vec::new()),
                fail_saves: true,
            }
        }
    }

    #[async_trait]
    impl DocumentStoreService for MemoryStore {
        async fn get_documents(&self) -> Vec<Document> {
            self.documents.lock().unwrap().clone()
        }

        async fn save_document(&self, document: &Document) -> PortResult<()> {
            if self.fail_saves {
                return Err(PortError::Storage("disk full".to_string()));
            }
            self.documents.lock().unwrap().push(document.clone());
            Ok(())
        }

        async fn delete_document(&self, id: Uuid) -> PortResult<()> {
            self.documents.lock().unwrap().retain(|d| d.id != id);
            Ok(())
        }

        async fn clear_all(&self) -> PortResult<()> {
            self.documents.lock().unwrap().clear();
            Ok(())
        }
    }

    fn conversion(note_name: Option<&str>) -> NoteConversion {
        NoteConversion {
            note_name: note_name.map(str::to_string),
            latex: "\\section{X}".to_string(),
            has_pdf: true,
        }
    }

    #[test]
    fn start_requires_a_non_empty_trimmed_name() {
        let mut session = CaptureSession::new();

        assert!(matches!(
            session.start("   "),
            Err(PortError::Validation(_))
        ));
        assert_eq!(session.phase(), CapturePhase::Naming);
        assert_eq!(session.document_name(), "");

        session.start("  Lecture 3  ").unwrap();
        assert_eq!(session.document_name(), "Lecture 3");
        assert_eq!(session.phase(), CapturePhase::Capturing);
    }

    #[test]
    fn photo_order_matches_surviving_insertions() {
        let mut session = CaptureSession::new();
        session.start("Ordering").unwrap();

        for uri in ["a.jpg", "b.jpg", "c.jpg", "d.jpg"] {
            session.add_photo(PhotoRef::new(uri)).unwrap();
        }
        let remaining = session.remove_photo(1).unwrap();
        assert_eq!(remaining, 3);

        let uris: Vec<&str> = session.photos().iter().map(|p| p.uri.as_str()).collect();
        assert_eq!(uris, vec!["a.jpg", "c.jpg", "d.jpg"]);

        assert!(matches!(
            session.remove_photo(3),
            Err(PortError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn submit_with_zero_photos_never_calls_the_backend() {
        let backend = MockBackend::returning(Ok(conversion(Some("unused"))));
        let store = MemoryStore::default();
        let mut session = CaptureSession::new();
        session.start("Empty").unwrap();

        let result = session.submit(&backend, &store).await;
        assert!(matches!(result, Err(PortError::Validation(_))));
        assert_eq!(backend.upload_calls(), 0);
        assert!(store.get_documents().await.is_empty());
    }

    #[tokio::test]
    async fn successful_submit_persists_one_record_and_clears_the_session() {
        let backend = MockBackend::returning(Ok(conversion(Some("lec3"))));
        let store = MemoryStore::default();
        let mut session = CaptureSession::new();
        session.start("Lecture 3").unwrap();
        session.add_photo(PhotoRef::new("a.jpg")).unwrap();
        session.add_photo(PhotoRef::new("b.jpg")).unwrap();

        let document = session.submit(&backend, &store).await.unwrap();

        assert_eq!(document.name, "Lecture 3");
        assert_eq!(document.filename, "lec3");
        assert_eq!(document.latex_content, "\\section{X}");
        assert!(document.pdf_available);

        let stored = store.get_documents().await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0], document);

        assert_eq!(session.photo_count(), 0);
        assert_eq!(session.document_name(), "");
        assert_eq!(session.phase(), CapturePhase::Idle);
    }

    #[tokio::test]
    async fn submit_falls_back_to_the_session_name_when_note_name_is_omitted() {
        let backend = MockBackend::returning(Ok(conversion(None)));
        let store = MemoryStore::default();
        let mut session = CaptureSession::new();
        session.start("Lecture 3").unwrap();
        session.add_photo(PhotoRef::new("a.jpg")).unwrap();

        let document = session.submit(&backend, &store).await.unwrap();
        assert_eq!(document.filename, "Lecture 3");
    }

    #[tokio::test]
    async fn transport_failure_preserves_the_session_for_retry() {
        let backend = MockBackend::returning(Err(PortError::Transport(
            "Upload failed: request timed out".to_string(),
        )));
        let store = MemoryStore::default();
        let mut session = CaptureSession::new();
        session.start("Lecture 3").unwrap();
        session.add_photo(PhotoRef::new("a.jpg")).unwrap();
        session.add_photo(PhotoRef::new("b.jpg")).unwrap();

        let result = session.submit(&backend, &store).await;
        assert!(matches!(result, Err(PortError::Transport(_))));

        // Photos and name untouched, no partial record written.
        assert_eq!(session.document_name(), "Lecture 3");
        let uris: Vec<&str> = session.photos().iter().map(|p| p.uri.as_str()).collect();
        assert_eq!(uris, vec!["a.jpg", "b.jpg"]);
        assert_eq!(session.phase(), CapturePhase::Capturing);
        assert!(store.get_documents().await.is_empty());
    }

    #[tokio::test]
    async fn storage_failure_also_preserves_the_session() {
        let backend = MockBackend::returning(Ok(conversion(Some("lec3"))));
        let store = MemoryStore::failing();
        let mut session = CaptureSession::new();
        session.start("Lecture 3").unwrap();
        session.add_photo(PhotoRef::new("a.jpg")).unwrap();

        let result = session.submit(&backend, &store).await;
        assert!(matches!(result, Err(PortError::Storage(_))));
        assert_eq!(session.photo_count(), 1);
        assert_eq!(session.phase(), CapturePhase::Capturing);
    }

    #[tokio::test]
    async fn submit_while_in_flight_is_refused_without_a_second_upload() {
        let backend = MockBackend::returning(Ok(conversion(Some("lec3"))));
        let store = MemoryStore::default();
        let mut session = CaptureSession::new();
        session.start("Lecture 3").unwrap();
        session.add_photo(PhotoRef::new("a.jpg")).unwrap();
        session.phase = CapturePhase::Submitting;

        let result = session.submit(&backend, &store).await;
        assert!(matches!(result, Err(PortError::Validation(_))));
        assert_eq!(backend.upload_calls(), 0);
    }

    #[test]
    fn cancel_discards_everything_unconditionally() {
        let mut session = CaptureSession::new();
        session.start("Doomed").unwrap();
        session.add_photo(PhotoRef::new("a.jpg")).unwrap();

        session.cancel();
        assert_eq!(session.photo_count(), 0);
        assert_eq!(session.document_name(), "");
        assert_eq!(session.phase(), CapturePhase::Idle);
    }

    #[test]
    fn reset_returns_an_idle_session_to_naming() {
        let mut session = CaptureSession::new();
        session.start("First pass").unwrap();
        session.add_photo(PhotoRef::new("a.jpg")).unwrap();

        session.reset();
        assert_eq!(session.phase(), CapturePhase::Naming);
        assert_eq!(session.photo_count(), 0);
    }
}
