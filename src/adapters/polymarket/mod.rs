//! Polymarket Adapter - Gamma Market Listing
//!
//! Public, unauthenticated access to the Gamma markets endpoint.

pub mod client;
pub mod quotes;
pub mod types;

pub use client::{GammaClient, GammaClientConfig};
pub use quotes::{GammaPaging, PolymarketQuoteProvider};
