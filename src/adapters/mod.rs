//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies (venue HTTP APIs, metrics export). Each
//! sub-module groups adapters by infrastructure concern.
//!
//! Adapter categories:
//! - `http`: shared retrying transport
//! - `kalshi`: RSA-PSS signed Kalshi markets listing
//! - `polymarket`: Polymarket Gamma markets listing
//! - `metrics`: Prometheus metrics export and health checks

pub mod http;
pub mod kalshi;
pub mod metrics;
pub mod polymarket;
