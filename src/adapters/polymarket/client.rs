//! Polymarket Gamma Client - Public Market Listing
//!
//! Unauthenticated. Markets come back as raw JSON values so one
//! malformed entry cannot void a whole page.

use std::time::Duration;

use reqwest::{Client, Url};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::adapters::http::{self, RetryPolicy};
use crate::domain::quote::Venue;
use crate::ports::quote_provider::ProviderError;

const VENUE: Venue = Venue::Polymarket;

/// Configuration for the Gamma client.
#[derive(Debug, Clone)]
pub struct GammaClientConfig {
  /// Gamma API base URL.
  pub base_url: String,
  /// Per-request timeout.
  pub timeout: Duration,
  /// Transient-failure retry policy.
  pub retry: RetryPolicy,
}

impl Default for GammaClientConfig {
  fn default() -> Self {
    Self {
      base_url: "https://gamma-api.polymarket.com".to_string(),
      timeout: Duration::from_secs(10),
      retry: RetryPolicy::default(),
    }
  }
}

/// HTTP client for the Gamma markets API.
pub struct GammaClient {
  http: Client,
  config: GammaClientConfig,
}

impl GammaClient {
  pub fn new(config: GammaClientConfig) -> Result<Self, ProviderError> {
    let http = http::build_client(VENUE, config.timeout)?;
    Ok(Self { http, config })
  }

  /// Fetch one page of active, unclosed markets.
  #[instrument(skip(self), fields(venue = "polymarket"))]
  pub async fn get_markets(&self, limit: u32, offset: u32) -> Result<Vec<Value>, ProviderError> {
    let raw = format!("{}/markets", self.config.base_url.trim_end_matches('/'));
    let mut url =
      Url::parse(&raw).map_err(|e| ProviderError::fetch(VENUE, format!("invalid URL {raw}: {e}")))?;
    url
      .query_pairs_mut()
      .append_pair("active", "true")
      .append_pair("closed", "false")
      .append_pair("limit", &limit.to_string())
      .append_pair("offset", &offset.to_string());

    let response =
      http::send_with_retry(&self.config.retry, VENUE, || Ok(self.http.get(url.clone()))).await?;

    let status = response.status();
    if !status.is_success() {
      let body = http::error_snippet(response).await;
      return Err(ProviderError::fetch(VENUE, format!("HTTP {status}: {body}")));
    }

    let payload: Value = response
      .json()
      .await
      .map_err(|e| ProviderError::fetch(VENUE, format!("malformed markets payload: {e}")))?;

    let markets = match payload {
      Value::Array(items) => items,
      // Some deployments wrap the list.
      Value::Object(mut obj) => match obj.remove("data").or_else(|| obj.remove("markets")) {
        Some(Value::Array(items)) => items,
        _ => return Err(ProviderError::fetch(VENUE, "markets payload is not a list")),
      },
      _ => return Err(ProviderError::fetch(VENUE, "markets payload is not a list")),
    };

    debug!(markets = markets.len(), offset, "Gamma page received");
    Ok(markets)
  }
}
