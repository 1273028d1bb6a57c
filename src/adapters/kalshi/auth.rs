//! Kalshi Authentication — RSA-PSS Request Signing
//!
//! Signs every Kalshi API request with the account's RSA private key.
//! Message: `timestamp_ms + METHOD + path` (no delimiters, path without
//! host or query). Signature: RSA-PSS, SHA-256, MGF1-SHA256, 32-byte
//! salt, base64-encoded.
//!
//! The key file is read lazily on the first signing call and cached for
//! the life of the signer, so a missing key fails the first request
//! rather than process startup.

use std::path::PathBuf;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use base64::Engine;
use rsa::RsaPrivateKey;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::pss::{BlindedSigningKey, Signature};
use rsa::sha2::Sha256;
use rsa::signature::{RandomizedSigner, SignatureEncoding};
use thiserror::Error;
use tracing::{debug, info};

use crate::ports::quote_provider::AuthFailure;

/// Header carrying the API key id.
pub const ACCESS_KEY_HEADER: &str = "KALSHI-ACCESS-KEY";
/// Header carrying the base64 signature.
pub const ACCESS_SIGNATURE_HEADER: &str = "KALSHI-ACCESS-SIGNATURE";
/// Header carrying the millisecond timestamp that was signed.
pub const ACCESS_TIMESTAMP_HEADER: &str = "KALSHI-ACCESS-TIMESTAMP";

/// Signer failures.
#[derive(Debug, Error)]
pub enum SignerError {
    /// Key material could not be read or parsed.
    #[error("signing key unavailable ({location}): {reason}")]
    KeyUnavailable { location: String, reason: String },
    /// The RSA operation failed.
    #[error("signing error: {0}")]
    Signing(String),
}

impl From<SignerError> for AuthFailure {
    fn from(err: SignerError) -> Self {
        match err {
            SignerError::KeyUnavailable { .. } => Self::KeyUnavailable(err.to_string()),
            SignerError::Signing(reason) => Self::SigningFailed(reason),
        }
    }
}

/// The three header values every authenticated request must carry.
///
/// Compute a fresh set per request: the timestamp is part of the
/// signed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthHeaders {
    pub key_id: String,
    pub signature: String,
    pub timestamp: String,
}

impl AuthHeaders {
    /// `(header name, value)` pairs, ready to attach to a request.
    pub fn pairs(&self) -> [(&'static str, &str); 3] {
        [
            (ACCESS_KEY_HEADER, self.key_id.as_str()),
            (ACCESS_SIGNATURE_HEADER, self.signature.as_str()),
            (ACCESS_TIMESTAMP_HEADER, self.timestamp.as_str()),
        ]
    }
}

/// Where the PEM comes from.
enum KeySource {
    File(PathBuf),
    Inline(String),
}

impl KeySource {
    fn describe(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Inline(_) => "inline PEM".to_string(),
        }
    }

    fn read(&self) -> Result<String, SignerError> {
        match self {
            Self::File(path) => {
                std::fs::read_to_string(path).map_err(|e| SignerError::KeyUnavailable {
                    location: self.describe(),
                    reason: e.to_string(),
                })
            }
            Self::Inline(pem) => Ok(pem.clone()),
        }
    }
}

/// Kalshi request signer.
///
/// Holds the API key id and a lazily parsed RSA-PSS signing key.
pub struct RequestSigner {
    /// API key id sent in `KALSHI-ACCESS-KEY`.
    key_id: String,
    /// Key material location.
    source: KeySource,
    /// Parsed key, set after the first successful load.
    signing_key: OnceLock<BlindedSigningKey<Sha256>>,
}

impl std::fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSigner")
            .field("key_id", &self.key_id)
            .field("source", &self.source.describe())
            .field("loaded", &self.signing_key.get().is_some())
            .finish()
    }
}

impl RequestSigner {
    /// Signer backed by a PEM file. The file is not touched until first use.
    pub fn from_key_file(key_id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            key_id: key_id.into(),
            source: KeySource::File(path.into()),
            signing_key: OnceLock::new(),
        }
    }

    /// Signer backed by an in-memory PEM string.
    pub fn from_pem(key_id: impl Into<String>, pem: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            source: KeySource::Inline(pem.into()),
            signing_key: OnceLock::new(),
        }
    }

    /// Build from the environment variables named in config.
    ///
    /// Only the variable lookup happens here; the key file itself is
    /// read on the first signing call.
    pub fn from_env(key_id_var: &str, key_path_var: &str) -> Result<Self> {
        let key_id = std::env::var(key_id_var).with_context(|| format!("{key_id_var} not set"))?;
        let key_path =
            std::env::var(key_path_var).with_context(|| format!("{key_path_var} not set"))?;

        Ok(Self::from_key_file(key_id, key_path))
    }

    /// API key id.
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Load (once) and return the signing key.
    ///
    /// A failed load is not cached; the next call tries again.
    pub fn load(&self) -> Result<&BlindedSigningKey<Sha256>, SignerError> {
        if let Some(key) = self.signing_key.get() {
            return Ok(key);
        }

        let pem = self.source.read()?;
        let private_key = parse_private_key(&pem).map_err(|reason| SignerError::KeyUnavailable {
            location: self.source.describe(),
            reason,
        })?;

        info!(key_id = %self.key_id, source = %self.source.describe(), "Signing key loaded");

        // A concurrent first call may have won the race; either key is identical.
        let _ = self.signing_key.set(BlindedSigningKey::<Sha256>::new(private_key));
        self.signing_key
            .get()
            .ok_or_else(|| SignerError::Signing("signing key cache empty after load".to_string()))
    }

    /// Sign a request at an explicit timestamp.
    pub fn sign(&self, method: &str, path: &str, timestamp_ms: i64) -> Result<AuthHeaders, SignerError> {
        let key = self.load()?;
        let timestamp = timestamp_ms.to_string();
        let message = canonical_message(&timestamp, method, path);

        let mut rng = rand::thread_rng();
        let signature: Signature = key
            .try_sign_with_rng(&mut rng, message.as_bytes())
            .map_err(|e| SignerError::Signing(e.to_string()))?;

        debug!(method, path = strip_query(path), "Request signed");

        Ok(AuthHeaders {
            key_id: self.key_id.clone(),
            signature: base64::engine::general_purpose::STANDARD.encode(signature.to_bytes()),
            timestamp,
        })
    }

    /// Sign a request at the current wall-clock time.
    pub fn sign_now(&self, method: &str, path: &str) -> Result<AuthHeaders, SignerError> {
        self.sign(method, path, chrono::Utc::now().timestamp_millis())
    }
}

/// The exact byte string the venue verifies: `timestamp + method + path`.
///
/// Any query string on `path` is dropped.
pub fn canonical_message(timestamp: &str, method: &str, path: &str) -> String {
    format!("{timestamp}{method}{}", strip_query(path))
}

fn strip_query(path: &str) -> &str {
    path.split('?').next().unwrap_or(path)
}

/// Parse a PKCS#8 or PKCS#1 PEM RSA key.
///
/// Inline PEMs copied out of env files often carry literal `\n`
/// sequences; both forms are accepted.
fn parse_private_key(pem: &str) -> Result<RsaPrivateKey, String> {
    let pem = pem.replace("\\n", "\n");
    let pem = pem.trim();

    RsaPrivateKey::from_pkcs8_pem(pem)
        .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
        .map_err(|e| format!("not a PEM RSA private key: {e}"))
}
