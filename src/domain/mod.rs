//! Domain layer - Core matching and spread-detection logic.
//!
//! Pure, synchronous, in-memory code: no I/O, no clocks, no shared
//! state. Everything here is constructed fresh per scan cycle and is
//! testable in isolation (hexagonal architecture inner ring).

pub mod detector;
pub mod matcher;
pub mod quote;
pub mod similarity;

// Re-export core types for convenience
pub use detector::{ArbitrageDetector, ArbitrageOpportunity, OpportunityKind};
pub use matcher::{MatchedMarket, Matcher, MatcherConfig};
pub use quote::{MarketQuote, Price, QuoteError, Side, Venue};
