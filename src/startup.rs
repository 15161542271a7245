//! Process Startup
//!
//! Brings the process up in order: database pool, HTTP session, bot. Any
//! failure along the way is fatal and is logged as a warning before it is
//! returned. Once the pool exists it is closed exactly once, however the
//! rest of startup ends.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use sqlx::PgPool;
use tokio::runtime::Handle;

use crate::bot::Bot;
use crate::config::Settings;
use crate::infrastructure::database::{self, PoolOptions};
use crate::infrastructure::http;
use crate::shared::{BootstrapError, ConfigError};

/// Load settings from `.env`, the process environment and configuration files.
pub fn load_settings() -> Result<Settings, ConfigError> {
    report_config(Settings::load())
}

/// Load settings from an explicit set of environment variables.
pub fn load_settings_from(vars: HashMap<String, String>) -> Result<Settings, ConfigError> {
    report_config(Settings::from_vars(vars))
}

fn report_config(result: Result<Settings, ConfigError>) -> Result<Settings, ConfigError> {
    if let Err(e) = &result {
        tracing::warn!("{}", e);
    }
    result
}

/// Run the bot until it stops or the process is told to shut down.
pub async fn run(settings: Settings) -> Result<(), BootstrapError> {
    let pool = match database::setup_pool(
        &settings.database.uri,
        PoolOptions::from(&settings.database),
    )
    .await
    {
        Ok(pool) => pool,
        Err(e) => {
            tracing::warn!("Failed to connect to database: {}", e);
            return Err(e);
        }
    };
    tracing::info!("Database connection pool created");

    with_pool(pool, |pool| launch(pool, settings)).await
}

/// Run `f` with the pool, then close the pool whatever `f` returned.
pub async fn with_pool<F, Fut, T>(pool: PgPool, f: F) -> T
where
    F: FnOnce(PgPool) -> Fut,
    Fut: Future<Output = T>,
{
    let output = f(pool.clone()).await;

    pool.close().await;
    tracing::info!("Database connection pool closed");

    output
}

async fn launch(pool: PgPool, settings: Settings) -> Result<(), BootstrapError> {
    let session = match http::build_session() {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!("Failed to create bot instance: {}", e);
            return Err(e);
        }
    };

    let bot = Arc::new(Bot::new(pool, session, Handle::current(), settings.bot.clone()));

    let result = tokio::select! {
        result = bot.start(&settings.bot.token) => result,
        _ = shutdown_signal() => {
            tracing::info!("Shutdown signal received");
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::warn!("Bot stopped with an error: {}", e);
    }

    bot.close().await;
    result
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for the shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
