//! Blocking HTTP collaborators: prompt translation, image generation, speech synthesis and
//! upload.
//!
//! Every collaborator is a trait with one network-backed implementation and, where a sensible
//! offline substitute exists, a local one. Failures are returned as [`ShortsError::Service`] and
//! turned into fallbacks by the production pipeline.

use std::time::Duration;

use crate::foundation::error::{ShortsError, ShortsResult};

/// Image generation.
pub mod image;
/// Speech synthesis.
pub mod speech;
/// Prompt translation.
pub mod translate;
/// Video upload.
pub mod upload;

pub(crate) fn http_client(timeout: Duration) -> ShortsResult<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ShortsError::service(format!("failed to create HTTP client: {e}")))
}

/// Turn a non-2xx response into a service error carrying the status and body.
pub(crate) fn ensure_success(
    resp: reqwest::blocking::Response,
    what: &str,
) -> ShortsResult<reqwest::blocking::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().unwrap_or_default();
    Err(ShortsError::service(format!(
        "{what} failed with HTTP {status}: {}",
        body.trim()
    )))
}
