//! # LotBot Library
//!
//! Process plumbing for a Discord bot:
//! - PostgreSQL pool bootstrap with a `jsonb` codec
//! - A shared HTTP session
//! - Timed, logged extension load/reload/unload that never takes the
//!   process down
//! - A process shell that owns the pool and session, loads the startup
//!   extensions and builds a context for every inbound event
//!
//! Gateway handling, sharding and rate limiting are left to `serenity`.
//!
//! ## Module Structure
//!
//! ```text
//! lotbot/
//! +-- config/         Environment and file configuration
//! +-- infrastructure/ Database pool and HTTP session
//! +-- extensions/     Extension catalog, manager and lifecycle wrapper
//! +-- bot/            Process shell, contexts and the gateway handler
//! +-- cog.rs          Cog base type and metadata
//! +-- shared/         Error types
//! ```

// Configuration module
pub mod config;

// Database pool and HTTP session
pub mod infrastructure;

// Loadable extensions
pub mod extensions;

// Process shell
pub mod bot;

// Feature modules
pub mod cog;

// Shared utilities
pub mod shared;

// Process startup
pub mod startup;

// Logging
pub mod telemetry;
