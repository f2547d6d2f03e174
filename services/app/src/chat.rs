//! services/app/src/chat.rs
//!
//! The chat transcript backing the math-chatbot screen. The backend call is
//! a stateless pass-through; the transcript only exists for display.

use chrono::{DateTime, Utc};
use lecture_notes_core::ports::{BackendService, PortError, PortResult};
use uuid::Uuid;

/// The greeting the transcript is seeded with.
const GREETING: &str = "Hi! I can help with math questions. Try asking me about:\n\n\
• Calculus (derivatives, integrals, limits)\n\
• Algebra (solving equations, simplification)\n\
• Linear algebra (matrices, eigenvalues)\n\
• Number theory (gcd, primes, modular arithmetic)\n\n\
Example: \"derivative of sin(x)^2\"";

/// Starter questions offered to the user before they type their own.
pub const SUGGESTED_QUESTIONS: &[&str] = &[
    "derivative of sin(x)^2",
    "integrate x^2 from 0 to 1",
    "solve x^2 - 5x + 6 = 0",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub id: Uuid,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    fn new(text: impl Into<String>, sender: Sender) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            sender,
            timestamp: Utc::now(),
        }
    }
}

/// An ordered message list seeded with a greeting. Errors never escape a
/// send; they are appended to the transcript as bot turns instead.
pub struct ChatTranscript {
    messages: Vec<ChatMessage>,
    sending: bool,
}

impl Default for ChatTranscript {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatTranscript {
    pub fn new() -> Self {
        Self {
            messages: vec![ChatMessage::new(GREETING, Sender::Bot)],
            sending: false,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// The most recent bot turn, for rendering after a send.
    pub fn last_reply(&self) -> Option<&ChatMessage> {
        self.messages.iter().rev().find(|m| m.sender == Sender::Bot)
    }

    /// Sends one message to the chatbot and appends both sides of the
    /// exchange. Empty input and overlapping sends are refused before any
    /// network call.
    pub async fn send(&mut self, text: &str, backend: &dyn BackendService) -> PortResult<()> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(PortError::Validation("Message is empty".to_string()));
        }
        if self.sending {
            return Err(PortError::Validation(
                "A message is already being sent".to_string(),
            ));
        }

        self.messages.push(ChatMessage::new(trimmed, Sender::User));
        self.sending = true;

        let reply = match backend.send_chat_message(trimmed, true).await {
            Ok(reply) if reply.reply.is_empty() => "No response".to_string(),
            Ok(reply) => reply.reply,
            Err(PortError::Transport(_)) => {
                "Failed to send message. Please check your backend connection.".to_string()
            }
            Err(e) => format!("Error: {}", e),
        };
        self.messages.push(ChatMessage::new(reply, Sender::Bot));

        self.sending = false;
        Ok(())
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
    use lecture_notes_core::domain::{
        ChatReply, HealthReport, NoteConversion, PhotoRef,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct MockBackend {
        chat_calls: AtomicUsize,
        reply: Mutex<Option<PortResult<ChatReply>>>,
    }

    impl MockBackend {
        fn returning(reply: PortResult<ChatReply>) -> Self {
            Self {
                chat_calls: AtomicUsize::new(0),
                reply: Mutex::new(Some(reply)),
            }
        }
    }

    #[async_trait]
    impl BackendService for MockBackend {
        async fn upload_photos(&self, _: &[PhotoRef]) -> PortResult<NoteConversion> {
            unimplemented!("not exercised")
        }

        async fn send_chat_message(&self, _: &str, _: bool) -> PortResult<ChatReply> {
            self.chat_calls.fetch_add(1, Ordering::SeqCst);
            self.reply
                .lock()
                .unwrap()
                .take()
                .expect("unscripted chat call")
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

    #[test]
    fn transcript_starts_with_the_greeting() {
        let transcript = ChatTranscript::new();
        assert_eq!(transcript.messages().len(), 1);
        assert_eq!(transcript.messages()[0].sender, Sender::Bot);
    }

    #[tokio::test]
    async fn empty_input_is_refused_before_any_call() {
        let backend = MockBackend::returning(Ok(ChatReply {
            reply: "unused".to_string(),
        }));
        let mut transcript = ChatTranscript::new();

        let result = transcript.send("   ", &backend).await;
        assert!(matches!(result, Err(PortError::Validation(_))));
        assert_eq!(backend.chat_calls.load(Ordering::SeqCst), 0);
        assert_eq!(transcript.messages().len(), 1);
    }

    #[tokio::test]
    async fn successful_send_appends_both_turns() {
        let backend = MockBackend::returning(Ok(ChatReply {
            reply: "2 sin(x) cos(x)".to_string(),
        }));
        let mut transcript = ChatTranscript::new();

        transcript
            .send("derivative of sin(x)^2", &backend)
            .await
            .unwrap();

        let messages = transcript.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].sender, Sender::User);
        assert_eq!(messages[1].text, "derivative of sin(x)^2");
        assert_eq!(messages[2].sender, Sender::Bot);
        assert_eq!(messages[2].text, "2 sin(x) cos(x)");
    }

    #[tokio::test]
    async fn backend_error_becomes_a_bot_turn_and_keeps_the_user_turn() {
        let backend = MockBackend::returning(Err(PortError::Backend {
            message: "solver unavailable".to_string(),
            code: Some("SOLVER_DOWN".to_string()),
            request_id: None,
        }));
        let mut transcript = ChatTranscript::new();

        transcript.send("integrate x^2", &backend).await.unwrap();

        let messages = transcript.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2].text, "Error: solver unavailable");
    }

    #[tokio::test]
    async fn transport_error_uses_the_connectivity_message() {
        let backend = MockBackend::returning(Err(PortError::Transport(
            "Chat request failed: request timed out".to_string(),
        )));
        let mut transcript = ChatTranscript::new();

        transcript.send("hello", &backend).await.unwrap();
        assert_eq!(
            transcript.last_reply().unwrap().text,
            "Failed to send message. Please check your backend connection."
        );
    }

    #[tokio::test]
    async fn empty_reply_falls_back_to_no_response() {
        let backend = MockBackend::returning(Ok(ChatReply {
            reply: String::new(),
        }));
        let mut transcript = ChatTranscript::new();

        transcript.send("anyone there?", &backend).await.unwrap();
        assert_eq!(transcript.last_reply().unwrap().text, "No response");
    }
}
