//! services/app/src/bin/health.rs
//!
//! One-shot liveness probe against the configured backend. Exits non-zero
//! when the backend is unreachable, so scripts can gate on it.

use app_lib::{
    adapters::HttpBackendAdapter,
    config::Config,
    error::AppError,
};
use lecture_notes_core::ports::BackendService;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = Config::from_env()?;
    let backend = HttpBackendAdapter::new(reqwest::Client::new(), &config);

    let reachable = backend.check_connection().await;
    println!("backend:   {}", config.backend_url);
    println!("reachable: {}", reachable);

    match backend.check_health().await {
        Ok(report) => println!("health:    {}", report.status),
        Err(e) => println!("health:    {}", e),
    }

    if !reachable {
        std::process::exit(1);
    }
    Ok(())
}
