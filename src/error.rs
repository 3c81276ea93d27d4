//! Error types shared by every key generation and derivation path.

use crate::keys::KeyScheme;

/// Error type for key generation and derivation failures.
///
/// None of these are retried internally. Retrying key generation either
/// reproduces the identical failure (under a deterministic seed) or
/// silently changes the output, so every error is returned to the caller
/// as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyGenError {
    /// A bounded (seeded) randomness stream could not satisfy a draw.
    RandomSourceExhausted {
        /// Bytes the adapter asked for.
        requested: usize,
        /// Bytes left in the stream when the draw was attempted.
        remaining: usize,
    },
    /// Scheme parameters are malformed (key size, exponent, unsupported
    /// scheme for the requested operation).
    InvalidSchemeParameters(String),
    /// Signing was attempted with a private key whose scheme disagrees
    /// with the record's declared public-key scheme.
    SchemeMismatch {
        expected: KeyScheme,
        actual: KeyScheme,
    },
    /// A batch projection was given more IP addresses than keysets.
    TooManyAddresses { ips: usize, keysets: usize },
    /// Input bytes do not parse as a scalar on the expected curve.
    MalformedKeyBytes(String),
}

impl std::fmt::Display for KeyGenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyGenError::RandomSourceExhausted {
                requested,
                remaining,
            } => write!(
                f,
                "random source exhausted: {} bytes requested, {} remaining in seeded stream",
                requested, remaining
            ),
            KeyGenError::InvalidSchemeParameters(msg) => {
                write!(f, "invalid scheme parameters: {}", msg)
            }
            KeyGenError::SchemeMismatch { expected, actual } => write!(
                f,
                "scheme mismatch: record expects a {} key, got {}",
                expected, actual
            ),
            KeyGenError::TooManyAddresses { ips, keysets } => write!(
                f,
                "number of IPs ({}) exceeds the number of keysets ({})",
                ips, keysets
            ),
            KeyGenError::MalformedKeyBytes(msg) => write!(f, "malformed key bytes: {}", msg),
        }
    }
}

impl std::error::Error for KeyGenError {}
