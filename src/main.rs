//! Venue Arb Scanner - Entry Point
//!
//! Initializes configuration, logging, venue clients and the scanner.
//! Runs one cycle with `--once`, otherwise loops until SIGINT.
//!
//! Wiring sequence:
//! 1. Parse CLI, load `.env`, load config.toml + validate
//! 2. Init tracing (JSON structured logging on stderr)
//! 3. Build the Kalshi signer from env (key file read lazily)
//! 4. Create Kalshi + Gamma clients and their quote providers
//! 5. Create the ArbitrageScanner (matcher + detector)
//! 6. Spawn metrics (:9090) and health (:8080) servers
//! 7. Run the scan loop, one JSON report per line on stdout
//! 8. Wait for SIGINT -> graceful shutdown

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use venue_arb_scanner::adapters::kalshi::{KalshiClient, KalshiQuoteProvider, RequestSigner};
use venue_arb_scanner::adapters::metrics::{HealthServer, HealthState, MetricsRegistry};
use venue_arb_scanner::adapters::polymarket::{GammaClient, PolymarketQuoteProvider};
use venue_arb_scanner::config::{self, AppConfig};
use venue_arb_scanner::domain::detector::ArbitrageDetector;
use venue_arb_scanner::domain::matcher::Matcher;
use venue_arb_scanner::usecases::scanner::{ArbitrageScanner, ScanReport};

/// Cross-venue prediction market spread scanner.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,
    /// Run a single scan cycle, print the report and exit.
    #[arg(long)]
    once: bool,
}

type Scanner = ArbitrageScanner<KalshiQuoteProvider, PolymarketQuoteProvider>;

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. CLI, .env, config ────────────────────────────────
    let cli = Cli::parse();
    // A missing .env is normal; real env vars still apply.
    let _ = dotenvy::dotenv();

    let config = config::loader::load_config(&cli.config)
        .context("Failed to load configuration")?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(&config.scanner.log_level)
            }),
        )
        .json()
        .with_writer(std::io::stderr)
        .init();

    info!(
        name = %config.scanner.name,
        version = env!("CARGO_PKG_VERSION"),
        once = cli.once,
        "Starting venue arb scanner"
    );

    // ── 3-5. Venue providers and scanner ────────────────────
    let mut scanner = build_scanner(&config)?;

    if cli.once {
        let report = scanner.run_cycle().await;
        emit(&report);
        return Ok(());
    }

    // ── 6. Metrics and health servers ───────────────────────
    let (shutdown_tx, _shutdown_rx) = broadcast::channel::<()>(1);
    let health = Arc::new(HealthState::new());
    let mut server_handles = Vec::new();

    let metrics = if config.metrics.enabled {
        let metrics = Arc::new(MetricsRegistry::new().context("Failed to register metrics")?);

        let metrics_server = Arc::clone(&metrics);
        let bind_address = config.metrics.bind_address.clone();
        let metrics_shutdown = shutdown_tx.subscribe();
        server_handles.push(tokio::spawn(async move {
            if let Err(e) = metrics_server.serve(bind_address, metrics_shutdown).await {
                error!(error = %e, "Metrics server failed");
            }
        }));

        let health_server = HealthServer::new(Arc::clone(&health), config.metrics.health_port);
        let health_shutdown = shutdown_tx.subscribe();
        server_handles.push(tokio::spawn(async move {
            if let Err(e) = health_server.run(health_shutdown).await {
                error!(error = %e, "Health server failed");
            }
        }));

        Some(metrics)
    } else {
        None
    };

    // ── 7. Scan loop ────────────────────────────────────────
    let interval = config.scanner.interval();
    let scan_shutdown = shutdown_tx.subscribe();
    let scan_health = Arc::clone(&health);
    let scan_handle = tokio::spawn(async move {
        scanner
            .run(interval, scan_shutdown, move |report| {
                if let Some(metrics) = &metrics {
                    metrics.record_cycle(report);
                }
                scan_health.update_from(report);
                emit(report);
            })
            .await;
    });

    info!("All tasks spawned, scanner is running");

    // ── 8. Wait for SIGINT ──────────────────────────────────
    if let Err(e) = signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for SIGINT, shutting down");
    } else {
        info!("SIGINT received, initiating graceful shutdown");
    }

    let _ = shutdown_tx.send(());
    health.mark_shutting_down();

    // An in-flight cycle finishes within the venue timeouts.
    if tokio::time::timeout(Duration::from_secs(30), scan_handle)
        .await
        .is_err()
    {
        warn!("Scanner did not stop within 30s");
    }
    for handle in server_handles {
        let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
    }

    info!("Shutdown complete");
    Ok(())
}

/// Wire venue adapters, matcher and detector into a scanner.
fn build_scanner(config: &AppConfig) -> Result<Scanner> {
    let signer = Arc::new(
        RequestSigner::from_env(&config.kalshi.api_key_env, &config.kalshi.key_path_env)
            .context("Kalshi credentials missing from environment")?,
    );

    let kalshi_client = KalshiClient::new(signer, config.kalshi.client_config())
        .context("Failed to create Kalshi client")?;
    let kalshi = KalshiQuoteProvider::new(kalshi_client, config.kalshi.paging());

    let gamma_client = GammaClient::new(config.polymarket.client_config())
        .context("Failed to create Gamma client")?;
    let polymarket = PolymarketQuoteProvider::new(gamma_client, config.polymarket.paging());

    Ok(ArbitrageScanner::new(
        Arc::new(kalshi),
        Arc::new(polymarket),
        Matcher::new(config.matching.to_matcher_config()),
        ArbitrageDetector::new(config.detection.min_edge),
        config.scanner.auth_failure_alert_after,
    ))
}

/// Write one report as a single JSON line on stdout.
fn emit(report: &ScanReport) {
    match serde_json::to_string(report) {
        Ok(line) => println!("{line}"),
        Err(e) => error!(error = %e, "Failed to serialize scan report"),
    }
}
