//! # LotBot
//!
//! Process entry point. Initializes:
//! - Tracing/logging subsystem
//! - Configuration (`BOT_TOKEN` and `POSTGRES_URI` are required)
//! - Database connection pool
//! - HTTP session and the Discord client

use std::process::ExitCode;

use tracing::info;

use lotbot::startup;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing subscriber for structured logging
    lotbot::telemetry::init_tracing();

    info!("Starting LotBot...");

    // Failures are logged where they happen
    let Ok(settings) = startup::load_settings() else {
        return ExitCode::FAILURE;
    };
    info!(
        environment = %settings.environment,
        prefix = %settings.bot.prefix,
        "Configuration loaded"
    );

    match startup::run(settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
