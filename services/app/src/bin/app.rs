//! services/app/src/bin/app.rs

use app_lib::{
    adapters::{ConsoleInteractionAdapter, FileStoreAdapter, HttpBackendAdapter},
    capture::{capture_process, CaptureOutcome},
    catalog::DocumentCatalog,
    chat::{ChatTranscript, SUGGESTED_QUESTIONS},
    config::Config,
    error::AppError,
    listening::{ListeningPhase, ListeningSimulation},
};
use lecture_notes_core::domain::Document;
use lecture_notes_core::ports::{BackendService, InteractionService};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Backend at {}", config.backend_url);

    // --- 2. Initialize Service Adapters ---
    let client = reqwest::Client::new();
    let backend = Arc::new(HttpBackendAdapter::new(client, &config));
    let store = Arc::new(FileStoreAdapter::new(&config.storage_dir));
    let ui = ConsoleInteractionAdapter::new();

    // --- 3. Probe the Backend ---
    if !backend.check_connection().await {
        ui.notify(
            "Offline",
            "Backend is not reachable; uploads and chat will fail until it is.",
        );
    }

    // --- 4. Load the Catalog and Run the Menu ---
    let mut catalog = DocumentCatalog::new(store.clone());
    catalog.refresh().await;

    loop {
        println!();
        println!("Lecture Notes");
        println!("  1) New document (capture photos)");
        println!("  2) Browse documents");
        println!("  3) Backend history");
        println!("  4) Math chatbot");
        println!("  5) Listening demo");
        println!("  6) Health check");
        println!("  q) Quit");

        let choice = ui.prompt_line("Choose").await?;
        match choice.trim() {
            "1" => {
                match capture_process(backend.as_ref(), store.as_ref(), &ui).await? {
                    CaptureOutcome::Saved(document) => {
                        info!(id = %document.id, "capture flow saved a document");
                        catalog.refresh().await;
                    }
                    CaptureOutcome::Cancelled => {}
                }
            }
            "2" => browse_documents(&mut catalog, backend.as_ref(), &ui).await?,
            "3" => match backend.get_history().await {
                Ok(notes) if notes.is_empty() => ui.notify("History", "No notes on the backend"),
                Ok(notes) => {
                    for name in notes {
                        println!("  - {}", name);
                    }
                }
                Err(e) => ui.notify("Error", &e.to_string()),
            },
            "4" => run_chat(backend.as_ref(), &ui).await?,
            "5" => run_listening_demo().await,
            "6" => {
                let reachable = backend.check_connection().await;
                println!("Reachable: {}", reachable);
                match backend.check_health().await {
                    Ok(report) => println!("Health: {}", report.status),
                    Err(e) => println!("Health: {}", e),
                }
            }
            "q" | "quit" => break,
            _ => ui.notify("Error", "Unknown choice"),
        }
    }

    Ok(())
}

/// The list/detail view over locally persisted documents.
async fn browse_documents(
    catalog: &mut DocumentCatalog,
    backend: &dyn BackendService,
    ui: &dyn InteractionService,
) -> Result<(), AppError> {
    catalog.refresh().await;
    if catalog.is_empty() {
        ui.notify("Files", "No documents yet. Capture one to get started.");
        return Ok(());
    }

    for (index, document) in catalog.list().iter().enumerate() {
        println!(
            "  {}) {}  ({})",
            index + 1,
            document.name,
            document.created.format("%Y-%m-%d")
        );
    }
    let choice = ui.prompt_line("Open which document? (empty to go back)").await?;
    let Ok(number) = choice.trim().parse::<usize>() else {
        return Ok(());
    };
    let Some(document) = number.checked_sub(1).and_then(|i| catalog.get(i)).cloned() else {
        ui.notify("Error", "No such document");
        return Ok(());
    };

    view_document(&document);

    let action = ui
        .prompt_line("Action: d=download latex, p=preview pdf, x=delete (empty to go back)")
        .await?;
    match action.trim() {
        "d" => match backend.download_latex(&document.filename).await {
            Ok(_) => ui.notify("Success", "LaTeX file downloaded"),
            Err(_) => ui.notify("Error", "Failed to download file"),
        },
        "p" => {
            if !document.pdf_available {
                ui.notify("PDF", "No PDF was generated for this document");
            } else {
                match backend.preview_pdf(&document.filename).await {
                    Ok(payload) => {
                        ui.notify("PDF", &format!("Received {} bytes of PDF", payload.len()))
                    }
                    Err(e) => ui.notify("Error", &e.to_string()),
                }
            }
        }
        "x" => {
            catalog.delete(document.id, ui).await;
        }
        _ => {}
    }
    Ok(())
}

fn view_document(document: &Document) {
    println!();
    println!("== {} ==", document.name);
    println!("filename: {}", document.filename);
    println!("created:  {}", document.created.to_rfc3339());
    println!();
    if document.latex_content.is_empty() {
        println!("(no LaTeX content)");
    } else {
        println!("{}", document.latex_content);
    }
    println!();
}

/// Read-send-print loop for the math chatbot. An empty line leaves the chat.
async fn run_chat(
    backend: &dyn BackendService,
    ui: &dyn InteractionService,
) -> Result<(), AppError> {
    let mut transcript = ChatTranscript::new();
    println!("{}", transcript.messages()[0].text);
    println!();
    println!("Suggestions:");
    for question in SUGGESTED_QUESTIONS {
        println!("  - {}", question);
    }

    loop {
        let line = ui.prompt_line("You (empty line to leave)").await?;
        if line.trim().is_empty() {
            return Ok(());
        }
        ui.progress("Thinking...");
        if let Err(e) = transcript.send(&line, backend).await {
            ui.notify("Error", &e.to_string());
            continue;
        }
        if let Some(reply) = transcript.last_reply() {
            println!("Bot: {}", reply.text);
        }
    }
}

/// Animates the simulated voice-to-notes flow on a fixed timer.
async fn run_listening_demo() {
    let mut simulation = ListeningSimulation::new();
    simulation.start();
    println!("{}", simulation.status_line());

    let mut timer = tokio::time::interval(Duration::from_millis(200));
    loop {
        timer.tick().await;
        match simulation.tick() {
            ListeningPhase::Idle => break,
            ListeningPhase::Listening { .. } => {}
            ListeningPhase::Converting { progress } => {
                println!("{} {:>3.0}%", simulation.status_line(), progress * 100.0);
            }
        }
    }
    println!("Done.");
}
