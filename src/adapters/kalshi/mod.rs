//! Kalshi Adapter - Authenticated Market Listing
//!
//! Signs requests with RSA-PSS, pages through open markets and
//! converts them into normalized quotes.

pub mod auth;
pub mod client;
pub mod quotes;
pub mod types;

pub use auth::{AuthHeaders, RequestSigner, SignerError};
pub use client::{KalshiClient, KalshiClientConfig};
pub use quotes::{KalshiPaging, KalshiQuoteProvider};
