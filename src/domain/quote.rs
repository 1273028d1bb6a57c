//! Normalized market quotes.
//!
//! Every venue adapter converts its native market payload into a
//! `MarketQuote`. Prices are validated once, at construction, so the
//! matcher and detector never see a price outside [0, 1].
//!
//! A missing price is `None`, never a numeric sentinel: 0.0 is a valid
//! price on a binary market.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prediction-market venue a quote was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Venue {
    /// Kalshi (authenticated REST API).
    Kalshi,
    /// Polymarket (public Gamma API).
    Polymarket,
}

impl Venue {
    /// Lowercase label used in logs and metric labels.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Kalshi => "kalshi",
            Self::Polymarket => "polymarket",
        }
    }
}

impl std::fmt::Display for Venue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which outcome of a binary market a price refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Yes,
    No,
}

/// Rejection reasons for a single quote.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuoteError {
    /// A price was NaN, infinite, or outside [0, 1].
    #[error("{field} {value} is outside [0, 1]")]
    InvalidPrice { field: &'static str, value: f64 },
    /// The question text was empty or whitespace-only.
    #[error("market question is empty")]
    EmptyQuestion,
}

/// A validated probability-unit price in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Price(f64);

impl Price {
    /// Validate a raw price.
    pub fn new(value: f64) -> Result<Self, QuoteError> {
        Self::checked("price", value)
    }

    fn checked(field: &'static str, value: f64) -> Result<Self, QuoteError> {
        if value.is_finite() && (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(QuoteError::InvalidPrice { field, value })
        }
    }

    /// Raw value.
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Price {
    type Error = QuoteError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for f64 {
    fn from(price: Price) -> Self {
        price.0
    }
}

/// One normalized market snapshot from a venue.
///
/// Built once per scan cycle by a quote provider and never mutated
/// afterwards. Fields are read through accessors so every instance,
/// deserialized ones included, has passed `MarketQuote::new`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "QuoteRecord")]
pub struct MarketQuote {
    venue: Venue,
    market_id: String,
    question: String,
    yes_price: Option<Price>,
    no_price: Option<Price>,
}

/// Unchecked wire form of a quote.
#[derive(Deserialize)]
struct QuoteRecord {
    venue: Venue,
    market_id: String,
    question: String,
    yes_price: Option<f64>,
    no_price: Option<f64>,
}

impl TryFrom<QuoteRecord> for MarketQuote {
    type Error = QuoteError;

    fn try_from(record: QuoteRecord) -> Result<Self, Self::Error> {
        Self::new(
            record.venue,
            record.market_id,
            record.question,
            record.yes_price,
            record.no_price,
        )
    }
}

impl MarketQuote {
    /// Build a quote, rejecting blank questions and out-of-range prices.
    pub fn new(
        venue: Venue,
        market_id: impl Into<String>,
        question: impl Into<String>,
        yes_price: Option<f64>,
        no_price: Option<f64>,
    ) -> Result<Self, QuoteError> {
        let question = question.into();
        if question.trim().is_empty() {
            return Err(QuoteError::EmptyQuestion);
        }

        Ok(Self {
            venue,
            market_id: market_id.into(),
            question,
            yes_price: yes_price
                .map(|p| Price::checked("yes_price", p))
                .transpose()?,
            no_price: no_price
                .map(|p| Price::checked("no_price", p))
                .transpose()?,
        })
    }

    /// Source venue.
    pub const fn venue(&self) -> Venue {
        self.venue
    }

    /// Venue-native identifier, kept for traceability only.
    pub fn market_id(&self) -> &str {
        &self.market_id
    }

    /// Human-readable market title; the matching key. Never blank.
    pub fn question(&self) -> &str {
        &self.question
    }

    /// Best executable price to take the YES side.
    pub const fn yes_price(&self) -> Option<Price> {
        self.yes_price
    }

    /// Best executable price to take the NO side.
    pub const fn no_price(&self) -> Option<Price> {
        self.no_price
    }

    /// Price for the given side, if the venue had liquidity there.
    pub const fn price(&self, side: Side) -> Option<Price> {
        match side {
            Side::Yes => self.yes_price,
            Side::No => self.no_price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_a_valid_price() {
        let quote =
            MarketQuote::new(Venue::Kalshi, "K-1", "Will it snow?", Some(0.0), None).unwrap();
        assert_eq!(quote.yes_price(), Some(Price::new(0.0).unwrap()));
        assert_eq!(quote.no_price(), None);
    }

    #[test]
    fn test_out_of_range_price_rejected() {
        let err = MarketQuote::new(Venue::Kalshi, "K-1", "Will it snow?", Some(0.4), Some(1.2))
            .unwrap_err();
        assert_eq!(
            err,
            QuoteError::InvalidPrice {
                field: "no_price",
                value: 1.2
            }
        );
    }

    #[test]
    fn test_nan_price_rejected() {
        assert!(Price::new(f64::NAN).is_err());
        assert!(Price::new(-0.01).is_err());
    }

    #[test]
    fn test_blank_question_rejected() {
        let err = MarketQuote::new(Venue::Polymarket, "0xabc", "   ", Some(0.5), Some(0.5))
            .unwrap_err();
        assert_eq!(err, QuoteError::EmptyQuestion);
    }

    #[test]
    fn test_deserialize_rejects_invalid_price() {
        let json = r#"{"venue":"kalshi","market_id":"K","question":"Q?","yes_price":1.5,"no_price":null}"#;
        assert!(serde_json::from_str::<MarketQuote>(json).is_err());
    }

    #[test]
    fn test_deserialize_rejects_blank_question() {
        let json = r#"{"venue":"polymarket","market_id":"0x1","question":"  ","yes_price":0.5,"no_price":null}"#;
        assert!(serde_json::from_str::<MarketQuote>(json).is_err());
    }

    #[test]
    fn test_serialized_quote_reads_back() {
        let quote =
            MarketQuote::new(Venue::Kalshi, "K-1", "Will it snow?", Some(0.25), None).unwrap();
        let json = serde_json::to_string(&quote).unwrap();
        let back: MarketQuote = serde_json::from_str(&json).unwrap();
        assert_eq!(back, quote);
        assert_eq!(back.question(), "Will it snow?");
    }

    #[test]
    fn test_venue_display() {
        assert_eq!(Venue::Kalshi.to_string(), "kalshi");
        assert_eq!(Venue::Polymarket.to_string(), "polymarket");
    }
}
