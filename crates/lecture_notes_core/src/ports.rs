//! crates/lecture_notes_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like the HTTP backend
//! or local device storage.

use crate::domain::{ChatReply, Document, HealthReport, NoteConversion, PhotoRef};
use async_trait::async_trait;
use bytes::Bytes;
use uuid::Uuid;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// The single error type for all port operations.
///
/// Callers pattern-match once instead of checking a success flag in one
/// channel and catching transport faults in another. No port operation
/// panics or propagates a raw transport error past this boundary.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// Caught before any network or storage call; no side effect occurred.
    #[error("{0}")]
    Validation(String),
    /// Timeout or unreachable backend. Retrying costs no rework.
    #[error("{0}")]
    Transport(String),
    /// A well-formed error envelope reported by the backend itself.
    #[error("{message}")]
    Backend {
        message: String,
        code: Option<String>,
        request_id: Option<String>,
    },
    /// Local storage I/O failure, downgraded to a branchable result.
    #[error("Storage error: {0}")]
    Storage(String),
    /// A catch-all for failures outside the taxonomy above.
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Uniform contract over the remote conversion/chat backend.
///
/// Every operation resolves to a `PortResult`; transport failures and
/// backend-reported failures both surface as error variants, never as
/// panics or unhandled faults.
#[async_trait]
pub trait BackendService: Send + Sync {
    /// Submits the full ordered photo sequence for OCR/LaTeX conversion.
    /// Server-side conversion can take minutes, not seconds.
    async fn upload_photos(&self, photos: &[PhotoRef]) -> PortResult<NoteConversion>;

    /// Sends one message to the math chatbot. Stateless pass-through.
    async fn send_chat_message(&self, message: &str, use_llm: bool) -> PortResult<ChatReply>;

    /// Fetches the raw LaTeX content for a backend-known note.
    async fn download_latex(&self, name: &str) -> PortResult<String>;

    /// Fetches the rendered PDF payload for a backend-known note.
    async fn preview_pdf(&self, name: &str) -> PortResult<Bytes>;

    /// Deletes a backend-side note.
    async fn delete_note(&self, name: &str) -> PortResult<()>;

    /// Lists the note names the backend currently knows about.
    async fn get_history(&self) -> PortResult<Vec<String>>;

    /// Short-timeout reachability probe, reduced to a plain boolean.
    async fn check_connection(&self) -> bool;

    /// Short-timeout liveness probe against the health endpoint.
    async fn check_health(&self) -> PortResult<HealthReport>;
}

/// Durable CRUD over the locally persisted document collection.
///
/// The whole collection lives under a single namespaced key and is replaced
/// wholesale on every mutation (read-modify-write). Concurrent writers are
/// not supported; the last writer wins.
#[async_trait]
pub trait DocumentStoreService: Send + Sync {
    /// Returns the full ordered collection. A missing or unreadable
    /// collection is treated as absent, not fatal.
    async fn get_documents(&self) -> Vec<Document>;

    /// Appends one record and writes the whole collection back.
    async fn save_document(&self, document: &Document) -> PortResult<()>;

    /// Removes all records matching `id` (expected exactly one) and writes
    /// the filtered collection back.
    async fn delete_document(&self, id: Uuid) -> PortResult<()>;

    /// Removes the entire collection.
    async fn clear_all(&self) -> PortResult<()>;
}

/// Capability to render prompts, confirmations, and progress to the user.
///
/// The surrounding screens own presentation; the core only consumes this
/// contract to drive two-step confirmations and retry-or-cancel flows.
#[async_trait]
pub trait InteractionService: Send + Sync {
    /// Asks the user for one line of input.
    async fn prompt_line(&self, prompt: &str) -> PortResult<String>;

    /// Asks the user to confirm a destructive or consequential action.
    async fn confirm(&self, title: &str, message: &str) -> bool;

    /// Shows a fire-and-forget notice.
    fn notify(&self, title: &str, message: &str);

    /// Reports that a long-running operation is underway.
    fn progress(&self, message: &str);
}
