// src/http.rs

//! Shared blocking HTTP client construction

use crate::error::{Error, Result};
use reqwest::blocking::Client;
use std::time::Duration;

/// Default timeout for every outbound request (30 seconds)
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("miui-tracker/", env!("CARGO_PKG_VERSION"));

/// Build a client with the given request timeout
///
/// A timed-out request surfaces as an ordinary transport error, so callers
/// handle it through the same degrade path as any other failure.
pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| Error::InitError(format!("Failed to create HTTP client: {e}")))
}
