//! Arbitrage Scanner - One-shot and Periodic Scan Cycles
//!
//! Each cycle:
//! 1. Fetches both venues concurrently
//! 2. Matches venue-A quotes to venue-B quotes by question text
//! 3. Detects YES/YES and NO/NO spreads on the matched pairs
//! 4. Ranks opportunities by edge and returns a `ScanReport`
//!
//! A venue that fails contributes no quotes; the cycle still completes.
//! Nothing survives between cycles except the auth-failure streaks.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::domain::detector::{ArbitrageDetector, ArbitrageOpportunity};
use crate::domain::matcher::Matcher;
use crate::domain::quote::{MarketQuote, Venue};
use crate::ports::quote_provider::{ProviderError, QuoteProvider};

/// Default consecutive auth failures before escalating to an error.
pub const DEFAULT_AUTH_FAILURE_ALERT_AFTER: u32 = 3;

/// Overall outcome of a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CycleStatus {
  /// Both venues answered.
  Complete,
  /// One venue failed; results cover the other only.
  Partial,
  /// Neither venue answered.
  Failed,
}

impl CycleStatus {
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Complete => "complete",
      Self::Partial => "partial",
      Self::Failed => "failed",
    }
  }
}

/// Per-venue outcome of a cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueSummary {
  pub venue: Venue,
  /// Quotes obtained (0 when the fetch failed).
  pub quotes: usize,
  /// Failure description, if the fetch failed.
  pub error: Option<String>,
  /// Stable failure label (`fetch`, `signature_rejected`, ...).
  pub error_kind: Option<String>,
}

/// Result of one scan cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
  pub cycle_id: Uuid,
  pub started_at: DateTime<Utc>,
  pub duration_ms: u64,
  pub status: CycleStatus,
  /// Venue A first, then venue B.
  pub venues: Vec<VenueSummary>,
  /// Number of matched market pairs.
  pub matched: usize,
  /// Opportunities, largest edge first.
  pub opportunities: Vec<ArbitrageOpportunity>,
}

impl ScanReport {
  /// Whether every venue answered this cycle.
  pub fn all_venues_ok(&self) -> bool {
    self.venues.iter().all(|v| v.error.is_none())
  }
}

/// Scanner orchestrating providers, matcher and detector.
pub struct ArbitrageScanner<A: QuoteProvider, B: QuoteProvider> {
  /// Venue A quote source (the matching driver).
  venue_a: Arc<A>,
  /// Venue B quote source.
  venue_b: Arc<B>,
  /// Question matcher.
  matcher: Matcher,
  /// Spread detector.
  detector: ArbitrageDetector,
  /// Streak length that triggers the error-level auth diagnostic.
  alert_after: u32,
  /// Consecutive auth failures for venue A and venue B.
  auth_streaks: [u32; 2],
}

impl<A: QuoteProvider, B: QuoteProvider> ArbitrageScanner<A, B> {
  /// Create a new scanner.
  pub fn new(
    venue_a: Arc<A>,
    venue_b: Arc<B>,
    matcher: Matcher,
    detector: ArbitrageDetector,
    alert_after: u32,
  ) -> Self {
    Self {
      venue_a,
      venue_b,
      matcher,
      detector,
      alert_after: alert_after.max(1),
      auth_streaks: [0; 2],
    }
  }

  /// Current consecutive auth-failure count for venue A (`0`) or B (`1`).
  pub const fn auth_failure_streak(&self, slot: usize) -> u32 {
    if slot < 2 { self.auth_streaks[slot] } else { 0 }
  }

  /// Run one complete scan cycle.
  #[instrument(skip(self), name = "scan_cycle")]
  pub async fn run_cycle(&mut self) -> ScanReport {
    let cycle_id = Uuid::new_v4();
    let started_at = Utc::now();
    let timer = Instant::now();

    let (result_a, result_b) =
      tokio::join!(self.venue_a.fetch_quotes(), self.venue_b.fetch_quotes());

    let venue_a = self.venue_a.venue();
    let venue_b = self.venue_b.venue();
    let (quotes_a, summary_a) = self.settle(0, venue_a, result_a);
    let (quotes_b, summary_b) = self.settle(1, venue_b, result_b);

    let status = match (summary_a.error.is_none(), summary_b.error.is_none()) {
      (true, true) => CycleStatus::Complete,
      (false, false) => CycleStatus::Failed,
      _ => CycleStatus::Partial,
    };

    let matches = self.matcher.match_quotes(&quotes_a, &quotes_b);
    let mut opportunities = self.detector.detect(&matches);
    opportunities.sort_by(|x, y| y.edge.total_cmp(&x.edge));

    let report = ScanReport {
      cycle_id,
      started_at,
      duration_ms: u64::try_from(timer.elapsed().as_millis()).unwrap_or(u64::MAX),
      status,
      venues: vec![summary_a, summary_b],
      matched: matches.len(),
      opportunities,
    };

    info!(
      cycle_id = %report.cycle_id,
      status = report.status.as_str(),
      quotes_a = quotes_a.len(),
      quotes_b = quotes_b.len(),
      matched = report.matched,
      opportunities = report.opportunities.len(),
      duration_ms = report.duration_ms,
      "Scan cycle complete"
    );

    report
  }

  /// Run cycles on a fixed interval until shutdown.
  ///
  /// The first cycle starts immediately. A cycle that overruns the
  /// interval delays the next one rather than bunching them up.
  pub async fn run<F>(
    &mut self,
    interval: Duration,
    mut shutdown_rx: broadcast::Receiver<()>,
    mut on_report: F,
  ) where
    F: FnMut(&ScanReport) + Send,
  {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(interval_s = interval.as_secs_f64(), "Starting scanner loop");

    loop {
      tokio::select! {
        _ = shutdown_rx.recv() => {
          info!("Shutdown signal received, stopping scanner");
          break;
        }
        _ = ticker.tick() => {
          let report = self.run_cycle().await;
          on_report(&report);
        }
      }
    }
  }

  /// Fold a provider result into quotes plus summary, tracking auth streaks.
  fn settle(
    &mut self,
    slot: usize,
    venue: Venue,
    result: Result<Vec<MarketQuote>, ProviderError>,
  ) -> (Vec<MarketQuote>, VenueSummary) {
    match result {
      Ok(quotes) => {
        self.auth_streaks[slot] = 0;
        let summary = VenueSummary {
          venue,
          quotes: quotes.len(),
          error: None,
          error_kind: None,
        };
        (quotes, summary)
      }
      Err(err) => {
        self.note_failure(slot, &err);
        let summary = VenueSummary {
          venue,
          quotes: 0,
          error: Some(err.to_string()),
          error_kind: Some(err.kind().to_string()),
        };
        (Vec::new(), summary)
      }
    }
  }

  fn note_failure(&mut self, slot: usize, err: &ProviderError) {
    let Some(failure) = err.auth_failure() else {
      self.auth_streaks[slot] = 0;
      warn!(venue = %err.venue(), error = %err, "Venue fetch failed, continuing without it");
      return;
    };

    self.auth_streaks[slot] += 1;
    let streak = self.auth_streaks[slot];

    if streak >= self.alert_after {
      error!(
        venue = %err.venue(),
        failure = failure.kind(),
        consecutive = streak,
        remediation = failure.remediation(),
        error = %err,
        "Persistent authentication failure"
      );
    } else {
      warn!(
        venue = %err.venue(),
        failure = failure.kind(),
        consecutive = streak,
        error = %err,
        "Authentication failed"
      );
    }
  }
}
