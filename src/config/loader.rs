//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::AppConfig;

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig> {
  let path = path.as_ref();

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config = parse_config(&content)
    .with_context(|| format!("Invalid configuration in {}", path.display()))?;

  info!(
    name = %config.scanner.name,
    interval_s = config.scanner.interval_seconds,
    threshold = config.matching.similarity_threshold,
    min_edge = config.detection.min_edge,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Parse and validate configuration text.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  let config: AppConfig = toml::from_str(content).context("Failed to parse config TOML")?;
  validate_config(&config)?;
  Ok(config)
}

/// Validate all configuration parameters.
fn validate_config(config: &AppConfig) -> Result<()> {
  // Scanner validation
  anyhow::ensure!(
    config.scanner.interval_seconds > 0,
    "scanner.interval_seconds must be positive"
  );
  anyhow::ensure!(
    config.scanner.auth_failure_alert_after > 0,
    "scanner.auth_failure_alert_after must be positive"
  );

  // Matching validation
  let threshold = config.matching.similarity_threshold;
  anyhow::ensure!(
    (0.0..=1.0).contains(&threshold),
    "matching.similarity_threshold must be in [0, 1], got {threshold}"
  );
  if let Some(cap) = config.matching.max_candidates {
    anyhow::ensure!(cap >= 1, "matching.max_candidates must be at least 1 when set");
  }

  // Detection validation
  let min_edge = config.detection.min_edge;
  anyhow::ensure!(
    (0.0..=1.0).contains(&min_edge),
    "detection.min_edge must be in [0, 1], got {min_edge}"
  );

  // Venue validation
  anyhow::ensure!(
    !config.kalshi.base_url.is_empty(),
    "kalshi.base_url must not be empty"
  );
  anyhow::ensure!(
    (1..=1000).contains(&config.kalshi.page_limit),
    "kalshi.page_limit must be in [1, 1000], got {}",
    config.kalshi.page_limit
  );
  anyhow::ensure!(config.kalshi.max_pages >= 1, "kalshi.max_pages must be at least 1");
  anyhow::ensure!(
    !config.kalshi.api_key_env.is_empty() && !config.kalshi.key_path_env.is_empty(),
    "kalshi.api_key_env and kalshi.key_path_env must name environment variables"
  );

  anyhow::ensure!(
    !config.polymarket.gamma_url.is_empty(),
    "polymarket.gamma_url must not be empty"
  );
  anyhow::ensure!(
    (1..=1000).contains(&config.polymarket.page_limit),
    "polymarket.page_limit must be in [1, 1000], got {}",
    config.polymarket.page_limit
  );
  anyhow::ensure!(
    config.polymarket.max_pages >= 1,
    "polymarket.max_pages must be at least 1"
  );

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_load_nonexistent_file() {
    let result = load_config("nonexistent.toml");
    assert!(result.is_err());
  }

  #[test]
  fn test_empty_config_uses_defaults() {
    let config = parse_config("").unwrap();
    assert_eq!(config.scanner.interval_seconds, 30);
    assert_eq!(config.scanner.auth_failure_alert_after, 3);
    assert!((config.matching.similarity_threshold - 0.55).abs() < f64::EPSILON);
    assert!(config.matching.max_candidates.is_none());
    assert!((config.detection.min_edge - 0.02).abs() < f64::EPSILON);
    assert_eq!(config.kalshi.api_key_env, "KALSHI_API_KEY");
    assert_eq!(config.kalshi.key_path_env, "KALSHI_API_SECRET_PATH");
    assert_eq!(config.kalshi.page_limit, 100);
    assert_eq!(config.polymarket.gamma_url, "https://gamma-api.polymarket.com");
    assert!(config.metrics.enabled);
    assert_eq!(config.metrics.health_port, 8080);
  }

  #[test]
  fn test_partial_section_keeps_other_defaults() {
    let config = parse_config(
      r#"
        [matching]
        similarity_threshold = 0.7

        [kalshi]
        max_pages = 5
      "#,
    )
    .unwrap();
    assert!((config.matching.similarity_threshold - 0.7).abs() < f64::EPSILON);
    assert_eq!(config.kalshi.max_pages, 5);
    assert_eq!(config.kalshi.page_limit, 100);
    assert_eq!(config.kalshi.paging().max_pages, 5);
  }

  #[test]
  fn test_threshold_out_of_range_rejected() {
    let err = parse_config("[matching]\nsimilarity_threshold = 1.5\n").unwrap_err();
    assert!(format!("{err:#}").contains("similarity_threshold"));
  }

  #[test]
  fn test_zero_candidate_cap_rejected() {
    assert!(parse_config("[matching]\nmax_candidates = 0\n").is_err());
  }

  #[test]
  fn test_page_limit_bounds() {
    assert!(parse_config("[kalshi]\npage_limit = 0\n").is_err());
    assert!(parse_config("[kalshi]\npage_limit = 1001\n").is_err());
    assert!(parse_config("[kalshi]\npage_limit = 1000\n").is_ok());
    assert!(parse_config("[polymarket]\npage_limit = 0\n").is_err());
    assert!(parse_config("[polymarket]\npage_limit = 4294967295\n").is_err());
    assert!(parse_config("[polymarket]\npage_limit = 1000\n").is_ok());
  }

  #[test]
  fn test_sample_config_parses() {
    let content = include_str!("../../config.toml");
    assert!(parse_config(content).is_ok());
  }
}
