//! HTTP client wrapper for fetching the concordance table.

use std::time::Duration;

use reqwest::blocking::Client;

use crate::config::HTTP_TIMEOUT_SECS;
use crate::error::Result;

/// User agent string identifying this extractor.
const USER_AGENT: &str = concat!("irs990-extractor/", env!("CARGO_PKG_VERSION"));

/// Create a configured HTTP client.
pub fn create_client() -> Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// Download the body of `url`.
///
/// Non-2xx responses are errors. There is no retry: a failed fetch is
/// reported to the caller, which decides whether to abort the run.
pub fn download_bytes(client: &Client, url: &str) -> Result<Vec<u8>> {
    tracing::debug!(url, "downloading");
    let response = client.get(url).send()?.error_for_status()?;
    let bytes = response.bytes()?;
    Ok(bytes.to_vec())
}

/// Decode bytes as UTF-8, replacing invalid sequences.
///
/// Logs a warning naming `what` when replacement was needed.
pub fn bytes_to_string(bytes: &[u8], what: &str) -> String {
    match String::from_utf8_lossy(bytes) {
        std::borrow::Cow::Borrowed(s) => s.to_string(),
        std::borrow::Cow::Owned(s) => {
            tracing::warn!(what, "invalid UTF-8 replaced while decoding");
            s
        }
    }
}
