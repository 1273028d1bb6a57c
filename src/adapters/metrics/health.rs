//! Health Check Server - Liveness and Readiness Probes
//!
//! Exposes /live and /ready endpoints via axum 0.7 for container
//! health checks. Readiness tracks whether both venues answered in the
//! most recent scan cycle.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use tokio::sync::broadcast;
use tracing::{info, instrument};

use crate::domain::quote::Venue;
use crate::usecases::scanner::ScanReport;

/// Shared health state polled by readiness probes.
#[derive(Debug, Default)]
pub struct HealthState {
    /// Kalshi answered in the last cycle.
    kalshi_ok: AtomicBool,
    /// Polymarket answered in the last cycle.
    polymarket_ok: AtomicBool,
    /// Set once shutdown begins; readiness never recovers.
    shutting_down: AtomicBool,
}

impl HealthState {
    /// Create a new health state (not ready until the first cycle).
    pub fn new() -> Self {
        Self::default()
    }

    fn flag(&self, venue: Venue) -> &AtomicBool {
        match venue {
            Venue::Kalshi => &self.kalshi_ok,
            Venue::Polymarket => &self.polymarket_ok,
        }
    }

    /// Record per-venue outcomes of a finished cycle.
    pub fn update_from(&self, report: &ScanReport) {
        for summary in &report.venues {
            self.flag(summary.venue)
                .store(summary.error.is_none(), Ordering::Relaxed);
        }
    }

    /// Whether the given venue answered in the last cycle.
    pub fn venue_ok(&self, venue: Venue) -> bool {
        self.flag(venue).load(Ordering::Relaxed)
    }

    /// Fail readiness from now on.
    pub fn mark_shutting_down(&self) {
        self.shutting_down.store(true, Ordering::Relaxed);
    }

    /// Check if both venues answered in the last cycle.
    pub fn is_ready(&self) -> bool {
        !self.shutting_down.load(Ordering::Relaxed)
            && self.venue_ok(Venue::Kalshi)
            && self.venue_ok(Venue::Polymarket)
    }
}

/// Axum-based health check HTTP server.
pub struct HealthServer {
    /// Health state shared with the scanner loop.
    state: Arc<HealthState>,
    /// Bind port (default 8080 from config).
    port: u16,
}

impl HealthServer {
    /// Create a new health server.
    pub const fn new(state: Arc<HealthState>, port: u16) -> Self {
        Self { state, port }
    }

    /// Start the health check server.
    #[instrument(skip(self, shutdown_rx))]
    pub async fn run(self, mut shutdown_rx: broadcast::Receiver<()>) -> anyhow::Result<()> {
        let app = Router::new()
            .route("/live", get(Self::liveness))
            .route("/ready", get(Self::readiness))
            .with_state(Arc::clone(&self.state));

        let addr = format!("0.0.0.0:{}", self.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        info!(address = %addr, "Health server started");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        Ok(())
    }

    /// Liveness probe: always returns 200 if the process is running.
    async fn liveness() -> impl IntoResponse {
        (StatusCode::OK, "OK")
    }

    /// Readiness probe: returns 200 only if both venues answered last cycle.
    async fn readiness(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
        if state.is_ready() {
            (StatusCode::OK, "READY")
        } else {
            (StatusCode::SERVICE_UNAVAILABLE, "NOT READY")
        }
    }
}
