//! Polymarket Quote Provider - Offset-paged Gamma Snapshot

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::client::GammaClient;
use super::types::GammaMarket;
use crate::domain::quote::{MarketQuote, Venue};
use crate::ports::quote_provider::{ProviderError, QuoteProvider};

/// Paging limits for one fetch.
#[derive(Debug, Clone, Copy)]
pub struct GammaPaging {
  pub page_limit: u32,
  pub max_pages: u32,
}

impl Default for GammaPaging {
  fn default() -> Self {
    Self {
      page_limit: 100,
      max_pages: 3,
    }
  }
}

impl GammaPaging {
  /// Offset of the given zero-based page, `None` past `u32::MAX`.
  pub const fn offset(&self, page: u32) -> Option<u32> {
    page.checked_mul(self.page_limit)
  }
}

/// Per-fetch conversion tallies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionStats {
  pub raw: usize,
  pub kept: usize,
  pub skipped_title: usize,
  pub invalid: usize,
}

/// Convert raw Gamma entries into quotes.
pub fn convert_markets(raw: Vec<Value>) -> (Vec<MarketQuote>, ConversionStats) {
  let mut stats = ConversionStats {
    raw: raw.len(),
    ..ConversionStats::default()
  };
  let mut quotes = Vec::with_capacity(raw.len());

  for value in raw {
    let market: GammaMarket = match serde_json::from_value(value) {
      Ok(m) => m,
      Err(e) => {
        stats.invalid += 1;
        warn!(error = %e, "Dropping unparsable Gamma market");
        continue;
      }
    };

    let question = market.question.as_deref().map(str::trim).unwrap_or_default();
    if question.is_empty() {
      stats.skipped_title += 1;
      continue;
    }

    let market_id = market.market_id().unwrap_or_default().to_string();
    match MarketQuote::new(
      Venue::Polymarket,
      market_id,
      question,
      market.yes_price(),
      market.no_price(),
    ) {
      Ok(quote) => quotes.push(quote),
      Err(e) => {
        stats.invalid += 1;
        warn!(market = ?market.market_id(), error = %e, "Dropping invalid Polymarket quote");
      }
    }
  }

  stats.kept = quotes.len();
  (quotes, stats)
}

/// `QuoteProvider` over the Gamma markets listing.
pub struct PolymarketQuoteProvider {
  client: GammaClient,
  paging: GammaPaging,
}

impl PolymarketQuoteProvider {
  pub const fn new(client: GammaClient, paging: GammaPaging) -> Self {
    Self { client, paging }
  }
}

#[async_trait]
impl QuoteProvider for PolymarketQuoteProvider {
  fn venue(&self) -> Venue {
    Venue::Polymarket
  }

  #[instrument(skip(self), fields(venue = "polymarket"))]
  async fn fetch_quotes(&self) -> Result<Vec<MarketQuote>, ProviderError> {
    let mut raw = Vec::new();
    let mut pages = 0;

    while pages < self.paging.max_pages {
      let offset = self.paging.offset(pages).ok_or_else(|| {
        ProviderError::fetch(
          Venue::Polymarket,
          format!("page offset overflows at page {pages}"),
        )
      })?;
      let page = self.client.get_markets(self.paging.page_limit, offset).await?;
      pages += 1;

      let received = page.len();
      raw.extend(page);
      debug!(page = pages, received, total = raw.len(), "Gamma page");

      if received < self.paging.page_limit as usize {
        break;
      }
    }

    let (quotes, stats) = convert_markets(raw);
    info!(
      pages,
      raw = stats.raw,
      kept = stats.kept,
      skipped_title = stats.skipped_title,
      invalid = stats.invalid,
      "Polymarket quotes loaded"
    );

    Ok(quotes)
  }
}
