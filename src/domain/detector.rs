//! Cross-venue spread detection.
//!
//! For every matched pair, compares the YES prices and, independently,
//! the NO prices across the two venues. A side whose absolute price
//! difference reaches `min_edge` becomes an opportunity: buy on the
//! cheaper venue, sell (or take the same side) on the dearer one.
//!
//! A pair contributes zero, one, or two opportunities. A side with an
//! absent price on either venue is skipped; no default is substituted.

use serde::{Deserialize, Serialize};

use super::matcher::MatchedMarket;
use super::quote::{Side, Venue};

/// Default minimum absolute price difference.
pub const DEFAULT_MIN_EDGE: f64 = 0.02;

/// Direction of a detected spread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OpportunityKind {
    /// YES on venue A vs YES on venue B.
    YesYes,
    /// NO on venue A vs NO on venue B.
    NoNo,
}

impl OpportunityKind {
    /// Market side both prices refer to.
    pub const fn side(self) -> Side {
        match self {
            Self::YesYes => Side::Yes,
            Self::NoNo => Side::No,
        }
    }

    /// Label used in logs and metric labels.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::YesYes => "YES_YES",
            Self::NoNo => "NO_NO",
        }
    }
}

/// A detected price spread between two matched markets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArbitrageOpportunity {
    pub kind: OpportunityKind,
    /// Price on venue A for `kind.side()`.
    pub price_a: f64,
    /// Price on venue B for `kind.side()`.
    pub price_b: f64,
    /// `|price_a - price_b|`, never below the configured minimum.
    pub edge: f64,
    /// Venue to buy on (the lower price; venue A on a tie).
    pub buy_venue: Venue,
    /// Venue with the higher price.
    pub sell_venue: Venue,
    /// Question text of the venue-A market, unmodified.
    pub market_a_desc: String,
    /// Question text of the venue-B market, unmodified.
    pub market_b_desc: String,
    pub market_a_id: String,
    pub market_b_id: String,
    /// Match score of the underlying pairing.
    pub similarity: f64,
}

impl ArbitrageOpportunity {
    /// Price on the buy venue.
    pub fn buy_price(&self) -> f64 {
        self.price_a.min(self.price_b)
    }

    /// Price on the sell venue.
    pub fn sell_price(&self) -> f64 {
        self.price_a.max(self.price_b)
    }
}

/// Emits opportunities whose edge reaches a fixed minimum.
#[derive(Debug, Clone)]
pub struct ArbitrageDetector {
    min_edge: f64,
}

impl ArbitrageDetector {
    pub const fn new(min_edge: f64) -> Self {
        Self { min_edge }
    }

    pub const fn min_edge(&self) -> f64 {
        self.min_edge
    }

    /// Scan matched pairs for YES/YES and NO/NO spreads.
    ///
    /// No ordering is imposed on the result.
    pub fn detect(&self, matches: &[MatchedMarket<'_>]) -> Vec<ArbitrageOpportunity> {
        matches
            .iter()
            .flat_map(|m| {
                [OpportunityKind::YesYes, OpportunityKind::NoNo]
                    .into_iter()
                    .filter_map(move |kind| self.evaluate(m, kind))
            })
            .collect()
    }

    fn evaluate(&self, pair: &MatchedMarket<'_>, kind: OpportunityKind) -> Option<ArbitrageOpportunity> {
        let side = kind.side();
        let price_a = pair.quote_a.price(side)?.value();
        let price_b = pair.quote_b.price(side)?.value();

        let edge = (price_a - price_b).abs();
        if edge < self.min_edge {
            return None;
        }

        let (buy_venue, sell_venue) = if price_a <= price_b {
            (pair.quote_a.venue(), pair.quote_b.venue())
        } else {
            (pair.quote_b.venue(), pair.quote_a.venue())
        };

        Some(ArbitrageOpportunity {
            kind,
            price_a,
            price_b,
            edge,
            buy_venue,
            sell_venue,
            market_a_desc: pair.quote_a.question().to_string(),
            market_b_desc: pair.quote_b.question().to_string(),
            market_a_id: pair.quote_a.market_id().to_string(),
            market_b_id: pair.quote_b.market_id().to_string(),
            similarity: pair.similarity,
        })
    }
}

impl Default for ArbitrageDetector {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_EDGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::quote::MarketQuote;

    fn pair<'a>(a: &'a MarketQuote, b: &'a MarketQuote) -> MatchedMarket<'a> {
        MatchedMarket {
            quote_a: a,
            quote_b: b,
            similarity: 0.9,
        }
    }

    fn kalshi(yes: Option<f64>, no: Option<f64>) -> MarketQuote {
        MarketQuote::new(Venue::Kalshi, "K1", "Will it rain tomorrow?", yes, no).unwrap()
    }

    fn poly(yes: Option<f64>, no: Option<f64>) -> MarketQuote {
        MarketQuote::new(
            Venue::Polymarket,
            "P1",
            "Will it rain tomorrow in the city?",
            yes,
            no,
        )
        .unwrap()
    }

    #[test]
    fn test_yes_spread_detected() {
        let a = kalshi(Some(0.40), None);
        let b = poly(Some(0.47), None);
        let opps = ArbitrageDetector::default().detect(&[pair(&a, &b)]);

        assert_eq!(opps.len(), 1);
        let opp = &opps[0];
        assert_eq!(opp.kind, OpportunityKind::YesYes);
        assert_eq!(opp.edge, (0.40f64 - 0.47).abs());
        assert_eq!(opp.buy_venue, Venue::Kalshi);
        assert_eq!(opp.sell_venue, Venue::Polymarket);
        assert_eq!(opp.market_a_desc, "Will it rain tomorrow?");
        assert_eq!(opp.market_b_desc, "Will it rain tomorrow in the city?");
    }

    #[test]
    fn test_both_sides_can_fire() {
        let a = kalshi(Some(0.40), Some(0.65));
        let b = poly(Some(0.47), Some(0.55));
        let opps = ArbitrageDetector::default().detect(&[pair(&a, &b)]);

        assert_eq!(opps.len(), 2);
        let no = opps.iter().find(|o| o.kind == OpportunityKind::NoNo).unwrap();
        assert_eq!(no.buy_venue, Venue::Polymarket);
        assert!((no.buy_price() - 0.55).abs() < 1e-12);
        assert!((no.sell_price() - 0.65).abs() < 1e-12);
    }

    #[test]
    fn test_below_min_edge_ignored() {
        let a = kalshi(Some(0.40), Some(0.60));
        let b = poly(Some(0.41), Some(0.59));
        assert!(ArbitrageDetector::default().detect(&[pair(&a, &b)]).is_empty());
    }

    #[test]
    fn test_absent_price_skips_side() {
        let a = kalshi(Some(0.40), Some(0.10));
        let b = poly(None, Some(0.90));
        let opps = ArbitrageDetector::default().detect(&[pair(&a, &b)]);

        assert_eq!(opps.len(), 1);
        assert_eq!(opps[0].kind, OpportunityKind::NoNo);
    }

    #[test]
    fn test_no_prices_on_one_venue_yields_nothing() {
        let a = kalshi(Some(0.40), None);
        let b = poly(None, None);
        assert!(ArbitrageDetector::default().detect(&[pair(&a, &b)]).is_empty());
    }

    #[test]
    fn test_zero_price_is_compared() {
        let a = kalshi(Some(0.0), None);
        let b = poly(Some(0.05), None);
        let opps = ArbitrageDetector::default().detect(&[pair(&a, &b)]);

        assert_eq!(opps.len(), 1);
        assert_eq!(opps[0].price_a, 0.0);
    }

    #[test]
    fn test_edge_equal_to_minimum_fires() {
        let a = kalshi(Some(0.25), None);
        let b = poly(Some(0.50), None);
        let opps = ArbitrageDetector::new(0.25).detect(&[pair(&a, &b)]);
        assert_eq!(opps.len(), 1);
    }

    #[test]
    fn test_kind_serializes_screaming_snake() {
        let json = serde_json::to_string(&OpportunityKind::YesYes).unwrap();
        assert_eq!(json, "\"YES_YES\"");
    }
}
