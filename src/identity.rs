//! # Identifier Derivation
//!
//! Pure functions mapping a public key to its externally-visible
//! identifiers:
//!
//! - [`EthAddress`]: Ethereum-style account address, the low 20 bytes of
//!   Keccak-256 over the uncompressed 64-byte X‖Y public key
//! - [`bls_pubkey_hex`]: canonical lowercase hex of a BLS public key
//! - [`recover_from_raw_private_key`]: the keystore-recovery path, which
//!   re-derives the public key by scalar multiplication of the curve
//!   base point and reuses the same address rule
//!
//! ## Derivation Invariants
//!
//! - An identifier is always a pure function of the public key bytes and
//!   the scheme tag. No global state, counter, or nonce participates.
//! - Address derivation has exactly one implementation. The fresh
//!   generation path and the recovery path both call [`eth_address`], so
//!   the same private key yields bit-identical addresses on both paths.

use k256::ecdsa::{SigningKey, VerifyingKey};
use sha3::{Digest, Keccak256};

use crate::error::KeyGenError;

/// A 20-byte Ethereum-style account address.
///
/// Displays as `0x` followed by 40 lowercase hex characters; this is the
/// only byte output in the crate that carries a `0x` prefix.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EthAddress([u8; 20]);

impl EthAddress {
    #[inline]
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl std::fmt::Display for EthAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl std::fmt::Debug for EthAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EthAddress({})", self)
    }
}

/// Derive the Ethereum-style address from a 64-byte X‖Y public key:
/// Keccak-256 over the concatenation, low 20 bytes.
pub fn eth_address(public_xy: &[u8; 64]) -> EthAddress {
    let hash = Keccak256::digest(public_xy);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    EthAddress(address)
}

/// The uncompressed X‖Y encoding of a secp256k1 public key, with the
/// SEC1 `0x04` tag stripped.
pub fn uncompressed_xy(public: &VerifyingKey) -> [u8; 64] {
    let point = public.to_encoded_point(false);
    let mut xy = [0u8; 64];
    xy.copy_from_slice(&point.as_bytes()[1..]);
    xy
}

/// Address of a secp256k1 verifying key.
pub fn address_of(public: &VerifyingKey) -> EthAddress {
    eth_address(&uncompressed_xy(public))
}

/// Canonical lowercase hex of a BLS public key, no prefix.
pub fn bls_pubkey_hex(public: &[u8]) -> String {
    hex::encode(public)
}

/// A keypair re-derived from raw private-key bytes recovered out of an
/// encrypted keystore by an external decryption step.
#[derive(Clone)]
pub struct RecoveredKey {
    pub address: EthAddress,
    pub public_xy: [u8; 64],
    pub private_key: [u8; 32],
}

impl std::fmt::Debug for RecoveredKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecoveredKey")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Re-derive public key and address from a raw secp256k1 private key.
///
/// This is a derivation, not a generation: the public key comes from
/// scalar multiplication of the base point, and the address comes from
/// the same [`eth_address`] rule the fresh-generation path uses.
pub fn recover_from_raw_private_key(bytes: &[u8]) -> Result<RecoveredKey, KeyGenError> {
    if bytes.len() != 32 {
        return Err(KeyGenError::MalformedKeyBytes(format!(
            "expected a 32-byte secp256k1 scalar, got {} bytes",
            bytes.len()
        )));
    }
    let mut scalar = [0u8; 32];
    scalar.copy_from_slice(bytes);

    let signing = SigningKey::from_bytes((&scalar).into()).map_err(|_| {
        KeyGenError::MalformedKeyBytes(
            "input is not a valid scalar on the secp256k1 curve".to_string(),
        )
    })?;

    let public_xy = uncompressed_xy(signing.verifying_key());
    Ok(RecoveredKey {
        address: eth_address(&public_xy),
        public_xy,
        private_key: scalar,
    })
}
