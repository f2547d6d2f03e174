//! services/app/src/adapters/console.rs
//!
//! This module contains the terminal adapter for the `InteractionService`
//! port. It renders prompts, confirmations, and progress on stdout and reads
//! answers from stdin.

use async_trait::async_trait;
use lecture_notes_core::ports::{InteractionService, PortError, PortResult};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

/// An adapter that implements `InteractionService` over the terminal.
#[derive(Clone, Default)]
pub struct ConsoleInteractionAdapter;

impl ConsoleInteractionAdapter {
    pub fn new() -> Self {
        Self
    }

    async fn read_line(&self) -> PortResult<String> {
        let mut reader = BufReader::new(tokio::io::stdin());
        let mut line = String::new();
        reader
            .read_line(&mut line)
            .await
            .map_err(|e| PortError::Unexpected(format!("Could not read input: {}", e)))?;
        Ok(line.trim_end_matches(['\n', '\r']).to_string())
    }
}

#[async_trait]
impl InteractionService for ConsoleInteractionAdapter {
    async fn prompt_line(&self, prompt: &str) -> PortResult<String> {
        print!("{}: ", prompt);
        std::io::stdout()
            .flush()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        self.read_line().await
    }

    /// Two-step confirmation for destructive actions. Anything other than an
    /// explicit yes counts as a refusal.
    async fn confirm(&self, title: &str, message: &str) -> bool {
        println!("{}", title);
        print!("{} [y/N]: ", message);
        if std::io::stdout().flush().is_err() {
            return false;
        }
        match self.read_line().await {
            Ok(answer) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
            Err(_) => false,
        }
    }

    fn notify(&self, title: &str, message: &str) {
        println!("[{}] {}", title, message);
    }

    fn progress(&self, message: &str) {
        println!("... {}", message);
    }
}
