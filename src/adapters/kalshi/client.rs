//! Kalshi HTTP Client - Signed REST Access
//!
//! Every attempt (including retries) is signed afresh with the current
//! timestamp. The signed path is the URL path as sent, so a base URL
//! with a path prefix (`/trade-api/v2`) is covered by the signature.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use tracing::{debug, instrument};

use super::auth::RequestSigner;
use super::types::MarketsResponse;
use crate::adapters::http::{self, RetryPolicy};
use crate::domain::quote::Venue;
use crate::ports::quote_provider::{AuthFailure, ProviderError};

const VENUE: Venue = Venue::Kalshi;

/// Configuration for the Kalshi client.
#[derive(Debug, Clone)]
pub struct KalshiClientConfig {
  /// API base URL including the version prefix.
  pub base_url: String,
  /// Per-request timeout.
  pub timeout: Duration,
  /// Transient-failure retry policy.
  pub retry: RetryPolicy,
}

impl Default for KalshiClientConfig {
  fn default() -> Self {
    Self {
      base_url: "https://api.elections.kalshi.com/trade-api/v2".to_string(),
      timeout: Duration::from_secs(10),
      retry: RetryPolicy::default(),
    }
  }
}

/// Authenticated client for the Kalshi trade API.
pub struct KalshiClient {
  /// Underlying HTTP client.
  http: Client,
  /// Request signer.
  signer: Arc<RequestSigner>,
  /// Client configuration.
  config: KalshiClientConfig,
}

impl KalshiClient {
  /// Create a new Kalshi client.
  pub fn new(signer: Arc<RequestSigner>, config: KalshiClientConfig) -> Result<Self, ProviderError> {
    let http = http::build_client(VENUE, config.timeout)?;
    Ok(Self {
      http,
      signer,
      config,
    })
  }

  /// Fetch one page of markets.
  #[instrument(skip(self), fields(venue = "kalshi"))]
  pub async fn get_markets(
    &self,
    status: &str,
    limit: u32,
    cursor: Option<&str>,
  ) -> Result<MarketsResponse, ProviderError> {
    let mut url = self.endpoint("/markets")?;
    {
      let mut query = url.query_pairs_mut();
      query.append_pair("limit", &limit.to_string());
      query.append_pair("status", status);
      if let Some(cursor) = cursor {
        query.append_pair("cursor", cursor);
      }
    }

    let response = http::send_with_retry(&self.config.retry, VENUE, || {
      let headers = self
        .signer
        .sign_now("GET", url.path())
        .map_err(|e| ProviderError::auth(VENUE, e.into()))?;

      let mut request = self.http.get(url.clone());
      for (name, value) in headers.pairs() {
        request = request.header(name, value);
      }
      Ok(request)
    })
    .await?;

    let status = response.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
      let body = http::error_snippet(response).await;
      return Err(ProviderError::auth(VENUE, classify_auth_rejection(status, &body)));
    }
    if !status.is_success() {
      let body = http::error_snippet(response).await;
      return Err(ProviderError::fetch(VENUE, format!("HTTP {status}: {body}")));
    }

    let page: MarketsResponse = response
      .json()
      .await
      .map_err(|e| ProviderError::fetch(VENUE, format!("malformed markets payload: {e}")))?;

    debug!(markets = page.markets.len(), has_next = page.next_cursor().is_some(), "Kalshi page received");
    Ok(page)
  }

  fn endpoint(&self, path: &str) -> Result<Url, ProviderError> {
    let raw = format!("{}{path}", self.config.base_url.trim_end_matches('/'));
    Url::parse(&raw).map_err(|e| ProviderError::fetch(VENUE, format!("invalid URL {raw}: {e}")))
  }
}

/// Map a 401/403 to the failure class the operator needs to act on.
pub fn classify_auth_rejection(status: StatusCode, body: &str) -> AuthFailure {
  let lower = body.to_ascii_lowercase();
  let detail = format!("HTTP {status}: {body}");

  let mentions_key = lower.contains("key");
  let not_known = ["not found", "unknown", "does not exist", "no such"]
    .iter()
    .any(|needle| lower.contains(needle));

  if mentions_key && not_known {
    AuthFailure::UnknownKeyId(detail)
  } else {
    AuthFailure::SignatureRejected(detail)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_unknown_key_classified() {
    let failure = classify_auth_rejection(
      StatusCode::UNAUTHORIZED,
      r#"{"error":{"code":"unauthorized","message":"API key not found"}}"#,
    );
    assert!(matches!(failure, AuthFailure::UnknownKeyId(_)));
  }

  #[test]
  fn test_bad_signature_classified() {
    let failure = classify_auth_rejection(StatusCode::UNAUTHORIZED, "invalid signature");
    assert!(matches!(failure, AuthFailure::SignatureRejected(_)));

    let failure = classify_auth_rejection(StatusCode::FORBIDDEN, "");
    assert!(matches!(failure, AuthFailure::SignatureRejected(_)));
  }

  #[test]
  fn test_endpoint_keeps_version_prefix() {
    let signer = Arc::new(RequestSigner::from_pem("k", "unused"));
    let client = KalshiClient::new(
      signer,
      KalshiClientConfig {
        base_url: "https://example.test/trade-api/v2/".to_string(),
        ..KalshiClientConfig::default()
      },
    )
    .unwrap();
    let url = client.endpoint("/markets").unwrap();
    assert_eq!(url.path(), "/trade-api/v2/markets");
  }
}
