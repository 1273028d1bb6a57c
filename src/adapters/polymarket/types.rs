//! Polymarket Gamma API Response Types
//!
//! Gamma is loose with types: numeric fields may arrive as strings and
//! `outcomePrices` is usually a JSON array encoded inside a string.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A market as listed by Gamma `GET /markets`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GammaMarket {
  /// Numeric Gamma id, used when no condition id is present.
  #[serde(default, deserialize_with = "de_string_opt")]
  pub id: Option<String>,
  /// CTF condition id (preferred market identifier).
  #[serde(rename = "conditionId", default)]
  pub condition_id: Option<String>,
  /// Market question.
  #[serde(default)]
  pub question: Option<String>,
  /// Best YES ask.
  #[serde(rename = "bestAsk", default, deserialize_with = "de_f64_opt")]
  pub best_ask: Option<f64>,
  /// Best YES bid.
  #[serde(rename = "bestBid", default, deserialize_with = "de_f64_opt")]
  pub best_bid: Option<f64>,
  /// Outcome prices, YES first then NO.
  #[serde(rename = "outcomePrices", default, deserialize_with = "de_f64_vec")]
  pub outcome_prices: Vec<f64>,
}

impl GammaMarket {
  /// Condition id, falling back to the Gamma id.
  pub fn market_id(&self) -> Option<&str> {
    [self.condition_id.as_deref(), self.id.as_deref()]
      .into_iter()
      .flatten()
      .find(|s| !s.is_empty())
  }

  /// YES price: the best ask, else the first outcome price.
  pub fn yes_price(&self) -> Option<f64> {
    self
      .best_ask
      .filter(|p| *p > 0.0)
      .or_else(|| self.outcome_prices.first().copied())
  }

  /// NO price: the complement of the best bid, else the second outcome price.
  pub fn no_price(&self) -> Option<f64> {
    self
      .best_bid
      .filter(|p| *p > 0.0)
      .map(|bid| 1.0 - bid)
      .or_else(|| self.outcome_prices.get(1).copied())
  }
}

fn de_string_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(match Value::deserialize(deserializer)? {
    Value::String(s) => Some(s),
    Value::Number(n) => Some(n.to_string()),
    _ => None,
  })
}

fn de_f64_opt<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
  D: Deserializer<'de>,
{
  value_to_f64(Value::deserialize(deserializer)?).map_err(serde::de::Error::custom)
}

fn de_f64_vec<'de, D>(deserializer: D) -> Result<Vec<f64>, D::Error>
where
  D: Deserializer<'de>,
{
  let items = match Value::deserialize(deserializer)? {
    Value::Array(items) => items,
    Value::String(s) if s.trim().is_empty() => return Ok(Vec::new()),
    Value::String(s) => serde_json::from_str::<Vec<Value>>(&s).map_err(serde::de::Error::custom)?,
    _ => return Ok(Vec::new()),
  };

  items
    .into_iter()
    .map(|v| {
      value_to_f64(v)?.ok_or_else(|| "outcome price is null".to_string())
    })
    .collect::<Result<_, _>>()
    .map_err(serde::de::Error::custom)
}

fn value_to_f64(value: Value) -> Result<Option<f64>, String> {
  match value {
    Value::Null => Ok(None),
    Value::Number(n) => Ok(n.as_f64()),
    Value::String(s) if s.trim().is_empty() => Ok(None),
    Value::String(s) => s
      .trim()
      .parse::<f64>()
      .map(Some)
      .map_err(|e| format!("not a number {s:?}: {e}")),
    other => Err(format!("unexpected price value {other}")),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn parse(json: &str) -> GammaMarket {
    serde_json::from_str(json).unwrap()
  }

  #[test]
  fn test_outcome_prices_as_encoded_string() {
    let m = parse(r#"{"id":"12","question":"Q","outcomePrices":"[\"0.35\", \"0.65\"]"}"#);
    assert_eq!(m.outcome_prices, vec![0.35, 0.65]);
    assert_eq!(m.yes_price(), Some(0.35));
    assert_eq!(m.no_price(), Some(0.65));
  }

  #[test]
  fn test_outcome_prices_as_array() {
    let m = parse(r#"{"id":12,"question":"Q","outcomePrices":[0.2,"0.8"]}"#);
    assert_eq!(m.outcome_prices, vec![0.2, 0.8]);
    assert_eq!(m.market_id(), Some("12"));
  }

  #[test]
  fn test_book_prices_preferred() {
    let m = parse(
      r#"{"conditionId":"0xabc","question":"Q","bestAsk":"0.41","bestBid":0.38,"outcomePrices":"[\"0.4\",\"0.6\"]"}"#,
    );
    assert_eq!(m.yes_price(), Some(0.41));
    assert!((m.no_price().unwrap() - 0.62).abs() < 1e-12);
    assert_eq!(m.market_id(), Some("0xabc"));
  }

  #[test]
  fn test_zero_book_falls_back() {
    let m = parse(r#"{"id":"1","question":"Q","bestAsk":0,"bestBid":0,"outcomePrices":"[\"0.4\",\"0.6\"]"}"#);
    assert_eq!(m.yes_price(), Some(0.4));
    assert_eq!(m.no_price(), Some(0.6));
  }

  #[test]
  fn test_missing_prices_absent() {
    let m = parse(r#"{"id":"1","question":"Q"}"#);
    assert!(m.yes_price().is_none());
    assert!(m.no_price().is_none());
  }

  #[test]
  fn test_garbage_price_rejected() {
    let err = serde_json::from_str::<GammaMarket>(r#"{"id":"1","bestAsk":"abc"}"#);
    assert!(err.is_err());
  }
}
