//! Quote Provider Port - Per-venue Market Snapshot Interface
//!
//! Defines the trait the scanner uses to pull one cycle's worth of
//! normalized quotes from a venue. Transport, pagination, auth and
//! payload parsing all live behind this boundary.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::quote::{MarketQuote, Venue};

/// Why an authenticated request could not be made or was refused.
///
/// Each variant maps to a different fix, so they are never collapsed
/// into a generic "unauthorized".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthFailure {
  /// The private key file is missing, unreadable, or not a valid key.
  #[error("signing key unavailable: {0}")]
  KeyUnavailable(String),
  /// The key loaded but the signing operation itself failed.
  #[error("request signing failed: {0}")]
  SigningFailed(String),
  /// The venue received a signed request and rejected the signature.
  #[error("signature rejected by venue: {0}")]
  SignatureRejected(String),
  /// The venue does not recognise the API key id.
  #[error("API key id not recognised by venue: {0}")]
  UnknownKeyId(String),
}

impl AuthFailure {
  /// Short operator-facing remediation hint.
  pub const fn remediation(&self) -> &'static str {
    match self {
      Self::KeyUnavailable(_) => {
        "check that the private key path exists, is readable, and holds a PEM RSA key"
      }
      Self::SigningFailed(_) => "the private key is malformed or too small; regenerate it",
      Self::SignatureRejected(_) => {
        "the key does not match the key id on the venue, or the clock is skewed; re-download the key pair"
      }
      Self::UnknownKeyId(_) => "the API key id is unknown to the venue; check the key id setting",
    }
  }

  /// Stable label for metrics.
  pub const fn kind(&self) -> &'static str {
    match self {
      Self::KeyUnavailable(_) => "key_unavailable",
      Self::SigningFailed(_) => "signing_failed",
      Self::SignatureRejected(_) => "signature_rejected",
      Self::UnknownKeyId(_) => "unknown_key_id",
    }
  }
}

/// Failure of a whole venue fetch for the current cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
  /// Transport failure, non-success status, or unparsable payload.
  #[error("{venue} fetch failed: {message}")]
  Fetch { venue: Venue, message: String },
  /// Authentication could not be established.
  #[error("{venue} authentication failed: {failure}")]
  Auth {
    venue: Venue,
    #[source]
    failure: AuthFailure,
  },
}

impl ProviderError {
  pub fn fetch(venue: Venue, message: impl Into<String>) -> Self {
    Self::Fetch {
      venue,
      message: message.into(),
    }
  }

  pub const fn auth(venue: Venue, failure: AuthFailure) -> Self {
    Self::Auth { venue, failure }
  }

  pub const fn venue(&self) -> Venue {
    match self {
      Self::Fetch { venue, .. } | Self::Auth { venue, .. } => *venue,
    }
  }

  /// The auth failure, if this is one.
  pub const fn auth_failure(&self) -> Option<&AuthFailure> {
    match self {
      Self::Auth { failure, .. } => Some(failure),
      Self::Fetch { .. } => None,
    }
  }

  /// Stable label for metrics.
  pub const fn kind(&self) -> &'static str {
    match self {
      Self::Fetch { .. } => "fetch",
      Self::Auth { failure, .. } => failure.kind(),
    }
  }
}

/// Trait for venue quote sources.
///
/// Implementors return a fresh, fully materialized quote list per call.
/// Individual malformed markets are dropped inside the provider; only
/// failures that void the whole venue surface as `ProviderError`.
/// No retries beyond the transport's own are expected of callers.
#[async_trait]
pub trait QuoteProvider: Send + Sync + 'static {
  /// Venue this provider reads from.
  fn venue(&self) -> Venue;

  /// Fetch the current quote set.
  async fn fetch_quotes(&self) -> Result<Vec<MarketQuote>, ProviderError>;
}
