//! Process settings and configuration structures.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::shared::ConfigError;

/// Environment variable holding the bot authentication token.
pub const BOT_TOKEN_VAR: &str = "BOT_TOKEN";

/// Environment variable holding the PostgreSQL connection URI.
pub const POSTGRES_URI_VAR: &str = "POSTGRES_URI";

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Discord bot configuration
    pub bot: BotSettings,

    /// Database configuration (PostgreSQL)
    pub database: DatabaseSettings,

    /// Current environment (development, staging, production)
    pub environment: String,
}

/// Discord bot configuration.
#[derive(Clone, Deserialize)]
pub struct BotSettings {
    /// Bot authentication token
    pub token: String,

    /// Prefix for text commands
    pub prefix: String,

    /// User ids allowed to run owner-only commands
    pub owners: Vec<u64>,
}

impl fmt::Debug for BotSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotSettings")
            .field("token", &"<redacted>")
            .field("prefix", &self.prefix)
            .field("owners", &self.owners)
            .finish()
    }
}

/// PostgreSQL pool configuration.
///
/// Everything except `uri` is forwarded untouched to the pool builder.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// Database connection URI
    pub uri: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections to maintain
    pub min_connections: u32,

    /// Connection acquire timeout in seconds
    pub acquire_timeout: u64,
}

impl Settings {
    /// Load settings from `.env`, the process environment and configuration files.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingVar` naming the first required variable
    /// that is absent, `ConfigError::EmptyValue` for a blank command prefix, or
    /// `ConfigError::Load` if the layered sources cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_vars(std::env::vars().collect())
    }

    /// Build settings from an explicit set of environment variables.
    ///
    /// The layering order is:
    /// 1. Built-in defaults
    /// 2. config/default.toml
    /// 3. config/{RUN_ENV}.toml
    /// 4. `APP__`-prefixed variables (APP__DATABASE__MAX_CONNECTIONS=20 -> database.max_connections)
    /// 5. `BOT_TOKEN` and `POSTGRES_URI`, which have no defaults
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let token = require(&vars, BOT_TOKEN_VAR)?;
        let uri = require(&vars, POSTGRES_URI_VAR)?;

        let environment = vars
            .get("RUN_ENV")
            .cloned()
            .unwrap_or_else(|| "development".into());

        let settings: Settings = Config::builder()
            .set_default("environment", environment.clone())?
            .set_default("bot.prefix", "!")?
            .set_default("bot.owners", Vec::<String>::new())?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 0)?
            .set_default("database.acquire_timeout", 30)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            .add_source(
                Environment::default()
                    .source(Some(vars))
                    .prefix("APP")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("bot.owners")
                    .try_parsing(true),
            )
            .set_override("bot.token", token)?
            .set_override("database.uri", uri)?
            .build()?
            .try_deserialize()?;

        if settings.bot.prefix.trim().is_empty() {
            return Err(ConfigError::EmptyValue("bot.prefix"));
        }

        Ok(settings)
    }
}

impl DatabaseSettings {
    /// Get the acquire timeout as a `Duration`.
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout)
    }
}

fn require(vars: &HashMap<String, String>, name: &'static str) -> Result<String, ConfigError> {
    match vars.get(name) {
        Some(value) if !value.trim().is_empty() => Ok(value.clone()),
        _ => Err(ConfigError::MissingVar(name)),
    }
}
