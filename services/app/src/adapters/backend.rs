//! services/app/src/adapters/backend.rs
//!
//! This module contains the HTTP backend adapter, which is the concrete
//! implementation of the `BackendService` port from the `core` crate. It
//! translates the four logical client operations (upload, chat, download,
//! delete) plus the probes into HTTP calls using `reqwest`.

use async_trait::async_trait;
use bytes::Bytes;
use lecture_notes_core::domain::{ChatReply, HealthReport, NoteConversion, PhotoRef};
use lecture_notes_core::ports::{BackendService, PortError, PortResult};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, error};
use uuid::Uuid;

use crate::config::Config;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A backend adapter that implements the `BackendService` port over HTTP.
#[derive(Clone)]
pub struct HttpBackendAdapter {
    client: reqwest::Client,
    base_url: String,
    upload_timeout: Duration,
    chat_timeout: Duration,
    probe_timeout: Duration,
}

impl HttpBackendAdapter {
    /// Creates a new `HttpBackendAdapter` from the loaded configuration.
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            base_url: config.backend_url.clone(),
            upload_timeout: config.upload_timeout,
            chat_timeout: config.chat_timeout,
            probe_timeout: config.probe_timeout,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

//=========================================================================================
// "Impure" Wire Format Structs
//=========================================================================================

/// The uniform response envelope the backend wraps every compute result in.
#[derive(Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    data: Option<T>,
    #[serde(default)]
    #[allow(dead_code)]
    message: Option<String>,
    error: Option<ErrorBody>,
}

/// The nested error object inside a failure envelope.
#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    code: Option<String>,
    request_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UploadData {
    note_name: Option<String>,
    latex: Option<String>,
    has_pdf: Option<bool>,
}
impl UploadData {
    fn to_domain(self) -> NoteConversion {
        NoteConversion {
            note_name: self.note_name,
            latex: self.latex.unwrap_or_default(),
            has_pdf: self.has_pdf.unwrap_or_default(),
        }
    }
}

#[derive(Deserialize)]
struct ChatData {
    reply: Option<String>,
}
impl ChatData {
    fn to_domain(self) -> ChatReply {
        ChatReply {
            reply: self.reply.unwrap_or_default(),
        }
    }
}

#[derive(Deserialize)]
struct HealthData {
    status: Option<String>,
}
impl HealthData {
    fn to_domain(self) -> HealthReport {
        HealthReport {
            status: self.status.unwrap_or_else(|| "unknown".to_string()),
        }
    }
}

/// The history endpoint answers either the standard envelope or a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum HistoryPayload {
    Wrapped { data: HistoryData },
    Bare(Vec<String>),
}

#[derive(Deserialize)]
struct HistoryData {
    #[serde(default)]
    notes: Vec<String>,
}

//=========================================================================================
// Error Mapping Helpers
//=========================================================================================

/// Maps a `reqwest` failure to the transport variant, keeping the user-facing
/// fallback message in front of the underlying cause.
fn transport_error(e: reqwest::Error, fallback: &str) -> PortError {
    if e.is_timeout() {
        PortError::Transport(format!("{}: request timed out", fallback))
    } else {
        PortError::Transport(format!("{}: {}", fallback, e))
    }
}

/// Builds the backend-reported error variant, extracting message/code/request id
/// from the nested error object when present.
fn backend_error(error: Option<ErrorBody>, fallback: &str) -> PortError {
    match error {
        Some(body) => PortError::Backend {
            message: body.message.unwrap_or_else(|| fallback.to_string()),
            code: body.code,
            request_id: body.request_id,
        },
        None => PortError::Backend {
            message: fallback.to_string(),
            code: None,
            request_id: None,
        },
    }
}

/// Decodes a response envelope, unifying the two failure channels: a
/// `success: false` envelope and a malformed body both come back as errors
/// the caller can branch on.
fn decode_envelope<T: DeserializeOwned>(body: &str, fallback: &str) -> PortResult<T> {
    let envelope: Envelope<T> = serde_json::from_str(body)
        .map_err(|e| PortError::Transport(format!("{}: malformed response ({})", fallback, e)))?;
    if envelope.success {
        envelope
            .data
            .ok_or_else(|| PortError::Transport(format!("{}: response carried no data", fallback)))
    } else {
        Err(backend_error(envelope.error, fallback))
    }
}

/// Prefers the envelope decoding result, but reports the HTTP status when an
/// error response carried no parseable envelope at all.
fn decode_or_status<T: DeserializeOwned>(
    body: &str,
    status: StatusCode,
    fallback: &str,
) -> PortResult<T> {
    match decode_envelope::<T>(body, fallback) {
        Err(PortError::Transport(_)) if !status.is_success() => {
            Err(PortError::Transport(format!("{}: HTTP {}", fallback, status)))
        }
        other => other,
    }
}

/// Generates the per-request correlation id carried in `X-Request-ID`.
fn correlation_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4())
}

//=========================================================================================
// `BackendService` Trait Implementation
//=========================================================================================

#[async_trait]
impl BackendService for HttpBackendAdapter {
    /// Uploads the ordered photo sequence as one multipart request, each photo
    /// encoded as a distinct `file` part.
    async fn upload_photos(&self, photos: &[PhotoRef]) -> PortResult<NoteConversion> {
        let mut form = reqwest::multipart::Form::new();
        for (index, photo) in photos.iter().enumerate() {
            let data = tokio::fs::read(&photo.uri).await.map_err(|e| {
                PortError::Unexpected(format!("Could not read photo '{}': {}", photo.uri, e))
            })?;
            let part = reqwest::multipart::Part::bytes(data)
                .file_name(format!("photo_{}.jpg", index))
                .mime_str("image/jpeg")
                .map_err(|e| PortError::Unexpected(e.to_string()))?;
            form = form.part("file", part);
        }

        let request_id = correlation_id("mobile");
        debug!(request_id = %request_id, photos = photos.len(), "uploading photo set");

        let response = self
            .client
            .post(self.endpoint("/upload"))
            .header("X-Request-ID", &request_id)
            .multipart(form)
            .timeout(self.upload_timeout)
            .send()
            .await
            .map_err(|e| {
                error!("Upload error: {}", e);
                transport_error(e, "Upload failed")
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(e, "Upload failed"))?;

        decode_or_status::<UploadData>(&body, status, "Upload failed").map(UploadData::to_domain)
    }

    async fn send_chat_message(&self, message: &str, use_llm: bool) -> PortResult<ChatReply> {
        let request_id = correlation_id("mobile-chat");

        let response = self
            .client
            .post(self.endpoint("/chat"))
            .header("X-Request-ID", &request_id)
            .json(&json!({
                "message": message,
                "use_llm": use_llm,
            }))
            .timeout(self.chat_timeout)
            .send()
            .await
            .map_err(|e| {
                error!("Chat error: {}", e);
                transport_error(e, "Chat request failed")
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(e, "Chat request failed"))?;

        decode_or_status::<ChatData>(&body, status, "Chat request failed").map(ChatData::to_domain)
    }

    async fn download_latex(&self, name: &str) -> PortResult<String> {
        let response = self
            .client
            .get(self.endpoint(&format!("/download/{}", name)))
            .query(&[("type", "tex")])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| transport_error(e, "Download failed"))?;

        response
            .text()
            .await
            .map_err(|e| transport_error(e, "Download failed"))
    }

    async fn preview_pdf(&self, name: &str) -> PortResult<Bytes> {
        let response = self
            .client
            .get(self.endpoint(&format!("/preview/{}", name)))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| transport_error(e, "Preview failed"))?;

        response
            .bytes()
            .await
            .map_err(|e| transport_error(e, "Preview failed"))
    }

    async fn delete_note(&self, name: &str) -> PortResult<()> {
        self.client
            .delete(self.endpoint(&format!("/delete/{}", name)))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| transport_error(e, "Delete failed"))?;
        Ok(())
    }

    async fn get_history(&self) -> PortResult<Vec<String>> {
        let response = self
            .client
            .get(self.endpoint("/history"))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| transport_error(e, "History request failed"))?;

        let payload: HistoryPayload = response
            .json()
            .await
            .map_err(|e| transport_error(e, "History request failed"))?;

        Ok(match payload {
            HistoryPayload::Wrapped { data } => data.notes,
            HistoryPayload::Bare(notes) => notes,
        })
    }

    /// Reduces any failure, transport or HTTP, to `false`.
    async fn check_connection(&self) -> bool {
        self.client
            .get(self.endpoint("/"))
            .timeout(self.probe_timeout)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .is_ok()
    }

    async fn check_health(&self) -> PortResult<HealthReport> {
        let response = self
            .client
            .get(self.endpoint("/health"))
            .timeout(self.probe_timeout)
            .send()
            .await
            .map_err(|e| transport_error(e, "Health check failed"))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(e, "Health check failed"))?;

        decode_or_status::<HealthData>(&body, status, "Health check failed")
            .map(HealthData::to_domain)
    }
}

//=========================================================================================
// Tests
//=========================================================================================
