//! Shared Utilities
//!
//! Common types used across all modules.

pub mod error;

pub use error::{BootstrapError, ConfigError, ExtensionError};
