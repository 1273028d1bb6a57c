//! Prometheus Metrics Registry - Scanner Observability
//!
//! Registers and exposes Prometheus metrics on :9090. Covers cycle
//! outcomes and latency, per-venue quote counts and failures, match
//! volume, and detected edge.

use std::sync::Arc;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use prometheus::{
    Encoder, Histogram, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec, Opts,
    Registry, TextEncoder,
};
use tokio::sync::broadcast;
use tracing::{info, instrument, warn};

use crate::usecases::scanner::ScanReport;

/// Centralized Prometheus metrics for the scanner.
///
/// All metrics follow the naming convention `venue_arb_*`.
pub struct MetricsRegistry {
    /// Prometheus registry.
    registry: Registry,
    /// Cycles run, by status.
    pub cycles: IntCounterVec,
    /// Cycle wall time (seconds).
    pub cycle_duration: Histogram,
    /// Quotes obtained in the last cycle, by venue.
    pub quotes: IntGaugeVec,
    /// Venue fetch failures, by venue and failure kind.
    pub provider_errors: IntCounterVec,
    /// Matched pairs in the last cycle.
    pub matched: IntGauge,
    /// Opportunities detected, by kind.
    pub opportunities: IntCounterVec,
    /// Edge of every detected opportunity, by kind.
    pub edge: HistogramVec,
}

impl MetricsRegistry {
    /// Create and register all Prometheus metrics.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let cycles = IntCounterVec::new(
            Opts::new("venue_arb_cycles_total", "Scan cycles run"),
            &["status"],
        )?;

        let cycle_duration = Histogram::with_opts(
            HistogramOpts::new("venue_arb_cycle_duration_seconds", "Scan cycle wall time")
                .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        )?;

        let quotes = IntGaugeVec::new(
            Opts::new("venue_arb_quotes", "Quotes obtained in the last cycle"),
            &["venue"],
        )?;

        let provider_errors = IntCounterVec::new(
            Opts::new("venue_arb_provider_errors_total", "Venue fetch failures"),
            &["venue", "kind"],
        )?;

        let matched = IntGauge::new("venue_arb_matched_pairs", "Matched pairs in the last cycle")?;

        let opportunities = IntCounterVec::new(
            Opts::new("venue_arb_opportunities_total", "Opportunities detected"),
            &["kind"],
        )?;

        let edge = HistogramVec::new(
            HistogramOpts::new("venue_arb_edge", "Absolute price difference per opportunity")
                .buckets(vec![0.01, 0.02, 0.03, 0.05, 0.10, 0.20, 0.50]),
            &["kind"],
        )?;

        // Register all metrics
        registry.register(Box::new(cycles.clone()))?;
        registry.register(Box::new(cycle_duration.clone()))?;
        registry.register(Box::new(quotes.clone()))?;
        registry.register(Box::new(provider_errors.clone()))?;
        registry.register(Box::new(matched.clone()))?;
        registry.register(Box::new(opportunities.clone()))?;
        registry.register(Box::new(edge.clone()))?;

        Ok(Self {
            registry,
            cycles,
            cycle_duration,
            quotes,
            provider_errors,
            matched,
            opportunities,
            edge,
        })
    }

    /// Fold one cycle's report into the metrics.
    pub fn record_cycle(&self, report: &ScanReport) {
        self.cycles.with_label_values(&[report.status.as_str()]).inc();
        #[allow(clippy::cast_precision_loss)]
        self.cycle_duration.observe(report.duration_ms as f64 / 1000.0);

        for venue in &report.venues {
            let label = venue.venue.as_str();
            self.quotes
                .with_label_values(&[label])
                .set(i64::try_from(venue.quotes).unwrap_or(i64::MAX));
            if let Some(kind) = &venue.error_kind {
                self.provider_errors
                    .with_label_values(&[label, kind.as_str()])
                    .inc();
            }
        }

        self.matched
            .set(i64::try_from(report.matched).unwrap_or(i64::MAX));

        for opp in &report.opportunities {
            let kind = opp.kind.as_str();
            self.opportunities.with_label_values(&[kind]).inc();
            self.edge.with_label_values(&[kind]).observe(opp.edge);
        }
    }

    /// Render the registry in the Prometheus text format.
    pub fn render(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Serve Prometheus metrics on the configured bind address.
    #[instrument(skip(self, shutdown_rx))]
    pub async fn serve(
        self: Arc<Self>,
        bind_address: String,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> anyhow::Result<()> {
        let metrics_self = Arc::clone(&self);

        let app = Router::new().route(
            "/metrics",
            get(move || {
                let metrics = Arc::clone(&metrics_self);
                async move {
                    match metrics.render() {
                        Ok(body) => (StatusCode::OK, body),
                        Err(e) => {
                            warn!(error = %e, "Failed to encode metrics");
                            (StatusCode::INTERNAL_SERVER_ERROR, String::new())
                        }
                    }
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind(&bind_address).await?;
        info!(address = %bind_address, "Prometheus metrics server started");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        Ok(())
    }
}
