//! Kalshi Quote Provider - Paged Market Snapshot
//!
//! Walks the open-markets listing by cursor and converts each market
//! into a normalized quote. Malformed markets are dropped one by one;
//! a failed page voids the whole fetch.

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use super::client::KalshiClient;
use super::types::KalshiMarket;
use crate::domain::quote::{MarketQuote, Venue};
use crate::ports::quote_provider::{ProviderError, QuoteProvider};

/// Paging limits for one fetch.
#[derive(Debug, Clone, Copy)]
pub struct KalshiPaging {
  /// Markets per page.
  pub page_limit: u32,
  /// Pages per fetch.
  pub max_pages: u32,
}

impl Default for KalshiPaging {
  fn default() -> Self {
    Self {
      page_limit: 100,
      max_pages: 3,
    }
  }
}

/// Per-fetch conversion tallies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionStats {
  pub raw: usize,
  pub kept: usize,
  pub skipped_status: usize,
  pub skipped_title: usize,
  pub invalid: usize,
}

/// Convert raw markets into quotes, tallying what was dropped and why.
pub fn convert_markets(markets: &[KalshiMarket]) -> (Vec<MarketQuote>, ConversionStats) {
  let mut stats = ConversionStats {
    raw: markets.len(),
    ..ConversionStats::default()
  };
  let mut quotes = Vec::with_capacity(markets.len());

  for market in markets {
    if market.is_inactive() {
      stats.skipped_status += 1;
      continue;
    }
    let Some(question) = market.question() else {
      stats.skipped_title += 1;
      continue;
    };

    match MarketQuote::new(
      Venue::Kalshi,
      market.ticker.clone(),
      question,
      market.yes_price(),
      market.no_price(),
    ) {
      Ok(quote) => quotes.push(quote),
      Err(e) => {
        stats.invalid += 1;
        warn!(ticker = %market.ticker, error = %e, "Dropping invalid Kalshi quote");
      }
    }
  }

  stats.kept = quotes.len();
  (quotes, stats)
}

/// `QuoteProvider` over the Kalshi markets listing.
pub struct KalshiQuoteProvider {
  client: KalshiClient,
  paging: KalshiPaging,
}

impl KalshiQuoteProvider {
  pub const fn new(client: KalshiClient, paging: KalshiPaging) -> Self {
    Self { client, paging }
  }

  async fn fetch_markets(&self) -> Result<(Vec<KalshiMarket>, u32), ProviderError> {
    let mut markets = Vec::new();
    let mut cursor: Option<String> = None;
    let mut pages = 0;

    while pages < self.paging.max_pages {
      let page = self
        .client
        .get_markets("open", self.paging.page_limit, cursor.as_deref())
        .await?;
      pages += 1;

      let received = page.markets.len();
      let next = page.next_cursor().map(str::to_string);
      markets.extend(page.markets);

      debug!(page = pages, received, total = markets.len(), "Kalshi page");

      if received < self.paging.page_limit as usize || next.is_none() {
        break;
      }
      cursor = next;
    }

    Ok((markets, pages))
  }
}

#[async_trait]
impl QuoteProvider for KalshiQuoteProvider {
  fn venue(&self) -> Venue {
    Venue::Kalshi
  }

  #[instrument(skip(self), fields(venue = "kalshi"))]
  async fn fetch_quotes(&self) -> Result<Vec<MarketQuote>, ProviderError> {
    let (markets, pages) = self.fetch_markets().await?;
    let (quotes, stats) = convert_markets(&markets);

    info!(
      pages,
      raw = stats.raw,
      kept = stats.kept,
      skipped_status = stats.skipped_status,
      skipped_title = stats.skipped_title,
      invalid = stats.invalid,
      "Kalshi quotes loaded"
    );
    for quote in quotes.iter().take(5) {
      debug!(
        ticker = %quote.market_id(),
        question = %quote.question(),
        yes = ?quote.yes_price().map(|p| p.value()),
        no = ?quote.no_price().map(|p| p.value()),
        "Kalshi sample"
      );
    }

    Ok(quotes)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn market(ticker: &str, title: &str, status: &str, yes_ask: f64, no_ask: f64) -> KalshiMarket {
    KalshiMarket {
      ticker: ticker.to_string(),
      title: Some(title.to_string()),
      status: Some(status.to_string()),
      yes_ask: Some(yes_ask),
      no_ask: Some(no_ask),
      ..KalshiMarket::default()
    }
  }

  #[test]
  fn test_convert_counts_each_skip_reason() {
    let markets = vec![
      market("A", "Will it rain tomorrow?", "open", 40.0, 62.0),
      market("B", "Closed one", "closed", 40.0, 62.0),
      market("C", "   ", "open", 40.0, 62.0),
      market("D", "Bad price", "open", 140.0, 62.0),
    ];
    let (quotes, stats) = convert_markets(&markets);

    assert_eq!(quotes.len(), 1);
    assert_eq!(quotes[0].market_id(), "A");
    assert_eq!(
      stats,
      ConversionStats {
        raw: 4,
        kept: 1,
        skipped_status: 1,
        skipped_title: 1,
        invalid: 1,
      }
    );
  }

  #[test]
  fn test_convert_scales_cents() {
    let (quotes, _) = convert_markets(&[market("A", "Q", "active", 40.0, 62.0)]);
    assert!((quotes[0].yes_price().unwrap().value() - 0.40).abs() < 1e-12);
    assert!((quotes[0].no_price().unwrap().value() - 0.62).abs() < 1e-12);
    assert_eq!(quotes[0].venue(), Venue::Kalshi);
  }

  #[test]
  fn test_convert_keeps_quote_without_prices() {
    let m = KalshiMarket {
      ticker: "E".to_string(),
      title: Some("No book yet".to_string()),
      ..KalshiMarket::default()
    };
    let (quotes, stats) = convert_markets(&[m]);
    assert_eq!(stats.kept, 1);
    assert!(quotes[0].yes_price().is_none());
    assert!(quotes[0].no_price().is_none());
  }
}
