//! # Configuration Module
//!
//! This module handles process configuration loading.
//! Configuration is read from:
//! - .env files (via dotenvy)
//! - `BOT_TOKEN` and `POSTGRES_URI`, both required
//! - Configuration files (config/default.toml, config/{environment}.toml)
//! - Environment variables prefixed with APP__
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lotbot::config::Settings;
//!
//! let settings = Settings::load()?;
//! println!("Commands use the {:?} prefix", settings.bot.prefix);
//! ```

mod settings;

pub use settings::*;
