//! HTTP Session
//!
//! The single outbound HTTP client shared by everything the bot runs.

use std::time::Duration;

use crate::shared::BootstrapError;

/// User agent sent with every outbound request.
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the HTTP session.
pub fn build_session() -> Result<reqwest::Client, BootstrapError> {
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()?;

    Ok(client)
}
