//! Infrastructure Layer
//!
//! Implementations for external services:
//! - Database pool bootstrap (PostgreSQL)
//! - HTTP session for outbound requests

pub mod database;
pub mod http;
