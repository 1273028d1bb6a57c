//! Configuration Module - TOML-based Scanner Configuration
//!
//! Loads and validates configuration from `config.toml`. Every section
//! and field has a default, so an empty file is a valid configuration.
//! Credentials never live here: only the names of the environment
//! variables that hold them.

pub mod loader;

use std::time::Duration;

use serde::Deserialize;

use crate::adapters::http::RetryPolicy;
use crate::adapters::kalshi::{KalshiClientConfig, KalshiPaging};
use crate::adapters::polymarket::{GammaClientConfig, GammaPaging};
use crate::domain::matcher::MatcherConfig;

/// Top-level scanner configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
  /// Scanner identity and loop settings.
  pub scanner: ScannerConfig,
  /// Question matching parameters.
  pub matching: MatchingConfig,
  /// Spread detection parameters.
  pub detection: DetectionConfig,
  /// Kalshi endpoint and credentials lookup.
  pub kalshi: KalshiConfig,
  /// Polymarket Gamma endpoint.
  pub polymarket: PolymarketConfig,
  /// Metrics and monitoring.
  pub metrics: MetricsConfig,
}

/// Scanner identity and loop configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
  /// Human-readable instance name.
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  pub log_level: String,
  /// Seconds between scan cycles.
  pub interval_seconds: u64,
  /// Consecutive auth failures before escalating to an error diagnostic.
  pub auth_failure_alert_after: u32,
}

impl Default for ScannerConfig {
  fn default() -> Self {
    Self {
      name: "venue-arb-scanner".to_string(),
      log_level: default_log_level(),
      interval_seconds: 30,
      auth_failure_alert_after: crate::usecases::scanner::DEFAULT_AUTH_FAILURE_ALERT_AFTER,
    }
  }
}

impl ScannerConfig {
  pub const fn interval(&self) -> Duration {
    Duration::from_secs(self.interval_seconds)
  }
}

/// Question matching configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
  /// Minimum similarity score for a pair to match.
  pub similarity_threshold: f64,
  /// Cap on candidates fully scored per venue-A quote.
  pub max_candidates: Option<usize>,
}

impl Default for MatchingConfig {
  fn default() -> Self {
    let defaults = MatcherConfig::default();
    Self {
      similarity_threshold: defaults.similarity_threshold,
      max_candidates: defaults.max_candidates,
    }
  }
}

impl MatchingConfig {
  pub const fn to_matcher_config(&self) -> MatcherConfig {
    MatcherConfig {
      similarity_threshold: self.similarity_threshold,
      max_candidates: self.max_candidates,
    }
  }
}

/// Spread detection configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
  /// Minimum absolute price difference to report.
  pub min_edge: f64,
}

impl Default for DetectionConfig {
  fn default() -> Self {
    Self {
      min_edge: crate::domain::detector::DEFAULT_MIN_EDGE,
    }
  }
}

/// Kalshi endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KalshiConfig {
  /// API base URL including the version prefix.
  pub base_url: String,
  /// Env var holding the API key id.
  pub api_key_env: String,
  /// Env var holding the private key PEM path.
  pub key_path_env: String,
  /// Markets per page.
  pub page_limit: u32,
  /// Pages per fetch.
  pub max_pages: u32,
  /// Per-request timeout (milliseconds).
  pub timeout_ms: u64,
  /// Retries on transient failures.
  pub max_retries: u32,
}

impl Default for KalshiConfig {
  fn default() -> Self {
    Self {
      base_url: "https://api.elections.kalshi.com/trade-api/v2".to_string(),
      api_key_env: "KALSHI_API_KEY".to_string(),
      key_path_env: "KALSHI_API_SECRET_PATH".to_string(),
      page_limit: 100,
      max_pages: 3,
      timeout_ms: default_timeout_ms(),
      max_retries: default_max_retries(),
    }
  }
}

impl KalshiConfig {
  pub fn client_config(&self) -> KalshiClientConfig {
    KalshiClientConfig {
      base_url: self.base_url.clone(),
      timeout: Duration::from_millis(self.timeout_ms),
      retry: retry_policy(self.max_retries),
    }
  }

  pub const fn paging(&self) -> KalshiPaging {
    KalshiPaging {
      page_limit: self.page_limit,
      max_pages: self.max_pages,
    }
  }
}

/// Polymarket Gamma endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PolymarketConfig {
  /// Gamma API base URL.
  pub gamma_url: String,
  /// Markets per page.
  pub page_limit: u32,
  /// Pages per fetch.
  pub max_pages: u32,
  /// Per-request timeout (milliseconds).
  pub timeout_ms: u64,
  /// Retries on transient failures.
  pub max_retries: u32,
}

impl Default for PolymarketConfig {
  fn default() -> Self {
    Self {
      gamma_url: "https://gamma-api.polymarket.com".to_string(),
      page_limit: 100,
      max_pages: 3,
      timeout_ms: default_timeout_ms(),
      max_retries: default_max_retries(),
    }
  }
}

impl PolymarketConfig {
  pub fn client_config(&self) -> GammaClientConfig {
    GammaClientConfig {
      base_url: self.gamma_url.clone(),
      timeout: Duration::from_millis(self.timeout_ms),
      retry: retry_policy(self.max_retries),
    }
  }

  pub const fn paging(&self) -> GammaPaging {
    GammaPaging {
      page_limit: self.page_limit,
      max_pages: self.max_pages,
    }
  }
}

/// Metrics and monitoring configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
  /// Enable Prometheus metrics export and health probes.
  #[serde(default = "default_true")]
  pub enabled: bool,
  /// Metrics server bind address.
  #[serde(default = "default_metrics_addr")]
  pub bind_address: String,
  /// Health check endpoint port.
  #[serde(default = "default_health_port")]
  pub health_port: u16,
}

impl Default for MetricsConfig {
  fn default() -> Self {
    Self {
      enabled: default_true(),
      bind_address: default_metrics_addr(),
      health_port: default_health_port(),
    }
  }
}

fn retry_policy(max_retries: u32) -> RetryPolicy {
  RetryPolicy {
    max_retries,
    ..RetryPolicy::default()
  }
}

// Default value functions for serde

fn default_log_level() -> String {
  "info".to_string()
}

const fn default_true() -> bool {
  true
}

const fn default_timeout_ms() -> u64 {
  10_000
}

const fn default_max_retries() -> u32 {
  2
}

fn default_metrics_addr() -> String {
  "0.0.0.0:9090".to_string()
}

const fn default_health_port() -> u16 {
  8080
}
