//! services/app/src/capture/flow.rs
//!
//! This module contains the asynchronous "worker" function that drives one
//! full document-creation attempt against the interaction port: name prompt,
//! photo accumulation, submit with retry-or-cancel, and confirmed cancel.

use crate::capture::session::CaptureSession;
use lecture_notes_core::domain::{Document, PhotoRef};
use lecture_notes_core::ports::{
    BackendService, DocumentStoreService, InteractionService, PortError, PortResult,
};
use tracing::{info, warn};

/// Represents the outcome of the capture flow.
/// This tells the caller what happened to the session.
#[derive(Debug, PartialEq)]
pub enum CaptureOutcome {
    /// The session was submitted and persisted as exactly one document.
    Saved(Document),
    /// The user cancelled; all photos and the name were discarded.
    Cancelled,
}

/// The main asynchronous flow for creating one document.
///
/// The session lives entirely inside this call: constructed on entry and
/// discarded on return, rather than reset through screen-lifecycle side
/// effects.
pub async fn capture_process(
    backend: &dyn BackendService,
    store: &dyn DocumentStoreService,
    ui: &dyn InteractionService,
) -> PortResult<CaptureOutcome> {
    let mut session = CaptureSession::new();

    // --- Name prompt (the "new document" modal) ---
    loop {
        let name = ui
            .prompt_line("Document name (leave empty to cancel)")
            .await?;
        if name.trim().is_empty() {
            if ui
                .confirm("Cancel", "Discard this document before it starts?")
                .await
            {
                return Ok(CaptureOutcome::Cancelled);
            }
            continue;
        }
        match session.start(&name) {
            Ok(()) => break,
            Err(e) => ui.notify("Error", &e.to_string()),
        }
    }
    info!(name = %session.document_name(), "capture session started");

    // --- Photo accumulation and submission ---
    loop {
        let input = ui
            .prompt_line("Photo path ('done' to submit, 'undo <n>' to remove, 'cancel' to discard)")
            .await?;
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input == "cancel" {
            if ui
                .confirm(
                    "Cancel",
                    "Are you sure you want to cancel? All photos will be lost.",
                )
                .await
            {
                session.cancel();
                return Ok(CaptureOutcome::Cancelled);
            }
            continue;
        }

        if input == "done" {
            match submit_with_retry(&mut session, backend, store, ui).await? {
                Some(outcome) => return Ok(outcome),
                // Validation refused the submit; keep capturing.
                None => continue,
            }
        }

        if let Some(position) = input.strip_prefix("undo") {
            match parse_position(position) {
                Some(index) => match session.remove_photo(index) {
                    Ok(0) => ui.notify("Gallery", "No photos left; gallery closed"),
                    Ok(count) => ui.notify("Gallery", &format!("{} photos", count)),
                    Err(e) => ui.notify("Error", &e.to_string()),
                },
                None => ui.notify("Error", "Usage: undo <photo number>"),
            }
            continue;
        }

        match session.add_photo(PhotoRef::new(input)) {
            Ok(count) => ui.notify("Camera", &format!("{} photos", count)),
            Err(e) => ui.notify("Error", &e.to_string()),
        }
    }
}

/// Submits the session, offering the retry-or-cancel continuation on
/// transport, backend, or storage failure. Returns `None` when a validation
/// error sent the user back to capturing.
async fn submit_with_retry(
    session: &mut CaptureSession,
    backend: &dyn BackendService,
    store: &dyn DocumentStoreService,
    ui: &dyn InteractionService,
) -> PortResult<Option<CaptureOutcome>> {
    loop {
        ui.progress("Extracting text...");
        match session.submit(backend, store).await {
            Ok(document) => {
                ui.notify("Success", "Document created successfully!");
                return Ok(Some(CaptureOutcome::Saved(document)));
            }
            Err(e @ PortError::Validation(_)) => {
                ui.notify("Error", &e.to_string());
                return Ok(None);
            }
            Err(e) => {
                warn!("Processing error: {}", e);
                ui.notify(
                    "Error",
                    "Failed to process document. Please check your backend connection and try again.",
                );
                if !ui.confirm("Retry", "Try the upload again?").await {
                    session.cancel();
                    return Ok(Some(CaptureOutcome::Cancelled));
                }
            }
        }
    }
}

fn parse_position(raw: &str) -> Option<usize> {
    let number: usize = raw.trim().parse().ok()?;
    // Positions are shown 1-based.
    number.checked_sub(1)
}

//=========================================================================================
// Tests
//=========================================================================================
