//! Venue HTTP Transport - Retrying Request Execution
//!
//! Shared by both venue clients. Transport errors, 429 and 5xx are
//! retried with exponential backoff; every other status is handed back
//! to the caller untouched so auth rejections are never retried.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::domain::quote::Venue;
use crate::ports::quote_provider::ProviderError;

/// Backoff settings for one venue.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
  /// Retries after the first attempt.
  pub max_retries: u32,
  /// Delay before the first retry; doubles per retry.
  pub base_delay: Duration,
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self {
      max_retries: 2,
      base_delay: Duration::from_millis(200),
    }
  }
}

impl RetryPolicy {
  /// Delay before retry number `attempt` (1-based).
  pub fn delay_for(&self, attempt: u32) -> Duration {
    self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
  }
}

/// Build the shared reqwest client for a venue.
pub fn build_client(venue: Venue, timeout: Duration) -> Result<Client, ProviderError> {
  Client::builder()
    .timeout(timeout)
    .pool_max_idle_per_host(5)
    .user_agent(concat!("venue-arb-scanner/", env!("CARGO_PKG_VERSION")))
    .build()
    .map_err(|e| ProviderError::fetch(venue, format!("failed to build HTTP client: {e}")))
}

/// Whether a status is worth another attempt.
pub fn is_retryable(status: StatusCode) -> bool {
  status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Send a request, retrying transient failures.
///
/// `build` is invoked once per attempt so callers can attach fresh
/// per-attempt headers (timestamps, signatures). An error from `build`
/// aborts immediately.
pub async fn send_with_retry<F>(
  policy: &RetryPolicy,
  venue: Venue,
  mut build: F,
) -> Result<Response, ProviderError>
where
  F: FnMut() -> Result<RequestBuilder, ProviderError>,
{
  let mut last_error = String::from("no attempt made");

  for attempt in 0..=policy.max_retries {
    if attempt > 0 {
      let delay = policy.delay_for(attempt);
      debug!(%venue, attempt, delay_ms = delay.as_millis() as u64, "Retrying request");
      sleep(delay).await;
    }

    let request = build()?;

    match request.send().await {
      Ok(response) => {
        let status = response.status();
        if !is_retryable(status) {
          return Ok(response);
        }
        warn!(%venue, status = %status, attempt, "Transient venue error");
        last_error = format!("HTTP {status}");
      }
      Err(e) => {
        warn!(%venue, error = %e, attempt, "Request failed");
        last_error = e.to_string();
      }
    }
  }

  Err(ProviderError::fetch(
    venue,
    format!(
      "giving up after {} attempts: {last_error}",
      policy.max_retries + 1
    ),
  ))
}

/// Read a bounded snippet of an error response body for diagnostics.
pub async fn error_snippet(response: Response) -> String {
  let body = response.text().await.unwrap_or_default();
  body.chars().take(200).collect()
}
