//! crates/lecture_notes_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any storage or serialization format.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Represents one converted lecture note, persisted locally after a
/// successful upload.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: Uuid,
    /// User-supplied display title, non-empty and trimmed.
    pub name: String,
    /// Server-assigned canonical note name. Falls back to `name` when the
    /// backend omits it, so the two may diverge from what the backend
    /// expects for download/delete lookups.
    pub filename: String,
    pub created: DateTime<Utc>,
    pub latex_content: String,
    pub pdf_available: bool,
}

/// An opaque, URI-like handle to a captured or picked image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoRef {
    pub uri: String,
}

impl PhotoRef {
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }
}

/// The payload the backend returns after converting an uploaded photo set.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteConversion {
    /// Canonical note name assigned by the backend, if it reported one.
    pub note_name: Option<String>,
    pub latex: String,
    pub has_pdf: bool,
}

// A single chatbot answer - the chat endpoint has no session concept.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub reply: String,
}

/// The backend's self-reported status from the health probe.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthReport {
    pub status: String,
}
