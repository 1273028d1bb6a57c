//! Kalshi API Response Types
//!
//! Only the fields the scanner reads are modelled; everything else in
//! the payload is ignored.

use serde::Deserialize;

/// One page of `GET /markets`.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketsResponse {
  /// Markets on this page.
  #[serde(default)]
  pub markets: Vec<KalshiMarket>,
  /// Opaque cursor for the next page; empty or absent on the last page.
  #[serde(default)]
  pub cursor: Option<String>,
}

impl MarketsResponse {
  /// Cursor for the next page, if there is one.
  pub fn next_cursor(&self) -> Option<&str> {
    self.cursor.as_deref().filter(|c| !c.is_empty())
  }
}

/// A Kalshi market as listed by `GET /markets`.
///
/// All prices are integer cents in `0..=100`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KalshiMarket {
  /// Market ticker (unique id).
  #[serde(default)]
  pub ticker: String,
  /// Market question.
  #[serde(default)]
  pub title: Option<String>,
  /// Secondary description, used when the title is blank.
  #[serde(default)]
  pub subtitle: Option<String>,
  /// Lifecycle status ("open", "active", "closed", "settled", ...).
  #[serde(default)]
  pub status: Option<String>,
  /// Best YES ask (cents).
  #[serde(default)]
  pub yes_ask: Option<f64>,
  /// Best YES bid (cents).
  #[serde(default)]
  pub yes_bid: Option<f64>,
  /// Best NO ask (cents).
  #[serde(default)]
  pub no_ask: Option<f64>,
  /// Best NO bid (cents).
  #[serde(default)]
  pub no_bid: Option<f64>,
  /// Last traded YES price (cents).
  #[serde(default)]
  pub last_price: Option<f64>,
}

/// Statuses that never yield a quote.
const INACTIVE_STATUSES: [&str; 3] = ["closed", "settled", "cancelled"];

impl KalshiMarket {
  /// Whether the market is closed, settled or cancelled.
  pub fn is_inactive(&self) -> bool {
    self
      .status
      .as_deref()
      .is_some_and(|s| INACTIVE_STATUSES.contains(&s.to_ascii_lowercase().as_str()))
  }

  /// Title, or the subtitle when the title is blank.
  pub fn question(&self) -> Option<&str> {
    [self.title.as_deref(), self.subtitle.as_deref()]
      .into_iter()
      .flatten()
      .map(str::trim)
      .find(|s| !s.is_empty())
  }

  /// YES price in `[0, 1]` units: the ask, else the last trade.
  pub fn yes_price(&self) -> Option<f64> {
    positive(self.yes_ask)
      .or_else(|| positive(self.last_price))
      .map(|cents| cents / 100.0)
  }

  /// NO price in `[0, 1]` units: the ask, else the complement of the last trade.
  pub fn no_price(&self) -> Option<f64> {
    positive(self.no_ask)
      .map(|cents| cents / 100.0)
      .or_else(|| positive(self.last_price).map(|last| (100.0 - last) / 100.0))
  }
}

fn positive(value: Option<f64>) -> Option<f64> {
  value.filter(|v| *v > 0.0)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn parse(json: &str) -> KalshiMarket {
    serde_json::from_str(json).unwrap()
  }

  #[test]
  fn test_ask_prices_preferred() {
    let m = parse(r#"{"ticker":"T","title":"Q","yes_ask":42,"no_ask":61,"last_price":40}"#);
    assert!((m.yes_price().unwrap() - 0.42).abs() < 1e-12);
    assert!((m.no_price().unwrap() - 0.61).abs() < 1e-12);
  }

  #[test]
  fn test_last_price_fallback() {
    let m = parse(r#"{"ticker":"T","title":"Q","yes_ask":0,"no_ask":0,"last_price":30}"#);
    assert!((m.yes_price().unwrap() - 0.30).abs() < 1e-12);
    assert!((m.no_price().unwrap() - 0.70).abs() < 1e-12);
  }

  #[test]
  fn test_no_prices_at_all() {
    let m = parse(r#"{"ticker":"T","title":"Q","yes_ask":null}"#);
    assert!(m.yes_price().is_none());
    assert!(m.no_price().is_none());
  }

  #[test]
  fn test_inactive_status_case_insensitive() {
    assert!(parse(r#"{"ticker":"T","status":"Settled"}"#).is_inactive());
    assert!(!parse(r#"{"ticker":"T","status":"open"}"#).is_inactive());
    assert!(!parse(r#"{"ticker":"T"}"#).is_inactive());
  }

  #[test]
  fn test_question_falls_back_to_subtitle() {
    let m = parse(r#"{"ticker":"T","title":"  ","subtitle":"Sub"}"#);
    assert_eq!(m.question(), Some("Sub"));
    assert_eq!(parse(r#"{"ticker":"T"}"#).question(), None);
  }

  #[test]
  fn test_cursor_empty_means_last_page() {
    let page: MarketsResponse = serde_json::from_str(r#"{"markets":[],"cursor":""}"#).unwrap();
    assert!(page.next_cursor().is_none());
    let page: MarketsResponse = serde_json::from_str(r#"{"markets":[],"cursor":"abc"}"#).unwrap();
    assert_eq!(page.next_cursor(), Some("abc"));
  }
}
