//! # Scheme Adapters
//!
//! This module defines the key algebras keymint can generate material
//! for, and the scheme-tagged [`KeyPair`] union the rest of the crate is
//! built around:
//!
//! - [`KeyScheme`]: enumerated scheme selector
//! - [`KeyPair`]: one generated keypair in its scheme's native form
//! - [`RsaKeyConfig`]: explicit RSA parameters (no package-level globals)
//!
//! ## Generation Model
//!
//! Every adapter draws from an [`EntropyStream`] and nothing else. The
//! same stream kind backs every scheme, so a seeded stream produces
//! bit-identical keypairs on every call and the adapters stay free of
//! hidden state. Adapters never retry on failure; under a deterministic
//! seed a retry reproduces the identical failure, and under the CSPRNG
//! it silently changes the output.
//!
//! ## Scalar Sampling
//!
//! secp256k1 private scalars are drawn by rejection sampling: 32-byte
//! candidates are pulled from the stream until one is a valid nonzero
//! scalar below the group order. A bounded stream converts a run of
//! rejections into `RandomSourceExhausted` at the next draw.
//!
//! ## RSA
//!
//! RSA prime search consumes an unbounded amount of randomness, far past
//! the 64 bytes a seeded stream holds, so seeded RSA generation fails
//! with `RandomSourceExhausted` up front instead of silently overdrawing.

use k256::ecdsa::{SigningKey, VerifyingKey};
use libp2p_identity::{ed25519, secp256k1};
use rand::rngs::OsRng;
use rsa::pkcs8::EncodePrivateKey;
use rsa::{BigUint, RsaPrivateKey};

use crate::entropy::EntropyStream;
use crate::error::KeyGenError;

/// RSA modulus size used when the caller does not override it.
pub const RSA_KEYPAIR_BITS: usize = 2048;

/// RSA public exponent used when the caller does not override it.
pub const RSA_KEYPAIR_EXPONENT: u64 = 65537;

/// Enumerated key algebra selector. Immutable once chosen for a
/// generation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyScheme {
    /// secp256k1 for devp2p-style network-identity records.
    Secp256k1Node,
    /// libp2p RSA identity key.
    Libp2pRsa,
    /// libp2p Ed25519 identity key.
    Libp2pEd25519,
    /// libp2p secp256k1 identity key.
    Libp2pSecp256k1,
    /// BLS12-381 validator consensus key.
    Bls,
}

impl KeyScheme {
    pub fn is_libp2p(&self) -> bool {
        matches!(
            self,
            KeyScheme::Libp2pRsa | KeyScheme::Libp2pEd25519 | KeyScheme::Libp2pSecp256k1
        )
    }
}

impl std::fmt::Display for KeyScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            KeyScheme::Secp256k1Node => "secp256k1-node",
            KeyScheme::Libp2pRsa => "libp2p-rsa",
            KeyScheme::Libp2pEd25519 => "libp2p-ed25519",
            KeyScheme::Libp2pSecp256k1 => "libp2p-secp256k1",
            KeyScheme::Bls => "bls",
        };
        f.write_str(name)
    }
}

/// RSA generation parameters, passed explicitly instead of living in
/// process-wide state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RsaKeyConfig {
    pub modulus_bits: usize,
    pub public_exponent: u64,
}

impl Default for RsaKeyConfig {
    fn default() -> Self {
        Self {
            modulus_bits: RSA_KEYPAIR_BITS,
            public_exponent: RSA_KEYPAIR_EXPONENT,
        }
    }
}

impl RsaKeyConfig {
    fn validate(&self) -> Result<(), KeyGenError> {
        if self.modulus_bits < 512 {
            return Err(KeyGenError::InvalidSchemeParameters(format!(
                "rsa modulus of {} bits is below the 512-bit minimum",
                self.modulus_bits
            )));
        }
        if self.public_exponent < 3 || self.public_exponent % 2 == 0 {
            return Err(KeyGenError::InvalidSchemeParameters(format!(
                "rsa public exponent {} must be an odd number >= 3",
                self.public_exponent
            )));
        }
        Ok(())
    }
}

/// Private-key export encoding for the libp2p schemes. Encoding only;
/// the key itself is unaffected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Libp2pKeyExport {
    /// Scheme-native byte layout (64-byte secret+public for Ed25519,
    /// 32-byte secret for secp256k1, PKCS#8 DER for RSA).
    Raw,
    /// Self-describing protobuf envelope carrying the key type tag plus
    /// the raw bytes.
    Wrapped,
}

/// A scheme-tagged keypair, exclusively owned by the caller and never
/// retained by this crate after the generation call returns.
#[derive(Clone)]
pub enum KeyPair {
    Secp256k1Node(SigningKey),
    Libp2p {
        scheme: KeyScheme,
        keypair: libp2p_identity::Keypair,
        raw: Vec<u8>,
    },
    Bls {
        secret: Vec<u8>,
        public: Vec<u8>,
    },
}

impl KeyPair {
    /// Generate a keypair for `scheme` from `stream`.
    ///
    /// `rsa` is consulted only by the RSA adapter; the other schemes
    /// have fixed native key sizes.
    pub fn generate(
        scheme: KeyScheme,
        stream: &mut EntropyStream,
        rsa: &RsaKeyConfig,
    ) -> Result<Self, KeyGenError> {
        match scheme {
            KeyScheme::Secp256k1Node => {
                let signing = secp256k1_signing_key(stream)?;
                Ok(KeyPair::Secp256k1Node(signing))
            }
            KeyScheme::Libp2pEd25519 => {
                let mut seed = [0u8; 32];
                stream.fill(&mut seed)?;
                let secret = ed25519::SecretKey::try_from_bytes(&mut seed).map_err(|e| {
                    KeyGenError::MalformedKeyBytes(format!("ed25519 seed rejected: {}", e))
                })?;
                let keypair = ed25519::Keypair::from(secret);
                let raw = keypair.to_bytes().to_vec();
                Ok(KeyPair::Libp2p {
                    scheme,
                    keypair: libp2p_identity::Keypair::from(keypair),
                    raw,
                })
            }
            KeyScheme::Libp2pSecp256k1 => {
                let signing = secp256k1_signing_key(stream)?;
                let raw = signing.to_bytes().to_vec();
                let mut scalar = raw.clone();
                let secret = secp256k1::SecretKey::try_from_bytes(&mut scalar).map_err(|e| {
                    KeyGenError::MalformedKeyBytes(format!("secp256k1 scalar rejected: {}", e))
                })?;
                let keypair = secp256k1::Keypair::from(secret);
                Ok(KeyPair::Libp2p {
                    scheme,
                    keypair: libp2p_identity::Keypair::from(keypair),
                    raw,
                })
            }
            KeyScheme::Libp2pRsa => {
                rsa.validate()?;
                if stream.is_bounded() {
                    // Prime search would overdraw any bounded stream.
                    return Err(KeyGenError::RandomSourceExhausted {
                        requested: rsa.modulus_bits / 8,
                        remaining: stream.remaining().unwrap_or(0),
                    });
                }
                let exponent = BigUint::from(rsa.public_exponent);
                let private = RsaPrivateKey::new_with_exp(&mut OsRng, rsa.modulus_bits, &exponent)
                    .map_err(|e| {
                        KeyGenError::InvalidSchemeParameters(format!("rsa key generation: {}", e))
                    })?;
                let document = private.to_pkcs8_der().map_err(|e| {
                    KeyGenError::MalformedKeyBytes(format!("rsa pkcs#8 encoding: {}", e))
                })?;
                let raw = document.as_bytes().to_vec();
                let mut der = raw.clone();
                let keypair = libp2p_identity::Keypair::rsa_from_pkcs8(&mut der).map_err(|e| {
                    KeyGenError::MalformedKeyBytes(format!("rsa pkcs#8 rejected: {}", e))
                })?;
                Ok(KeyPair::Libp2p {
                    scheme,
                    keypair,
                    raw,
                })
            }
            KeyScheme::Bls => {
                let mut ikm = [0u8; 32];
                stream.fill(&mut ikm)?;
                let secret = blst::min_pk::SecretKey::key_gen(&ikm, &[]).map_err(|e| {
                    KeyGenError::InvalidSchemeParameters(format!("bls key generation: {:?}", e))
                })?;
                let public = secret.sk_to_pk();
                Ok(KeyPair::Bls {
                    secret: secret.to_bytes().to_vec(),
                    public: public.to_bytes().to_vec(),
                })
            }
        }
    }

    pub fn scheme(&self) -> KeyScheme {
        match self {
            KeyPair::Secp256k1Node(_) => KeyScheme::Secp256k1Node,
            KeyPair::Libp2p { scheme, .. } => *scheme,
            KeyPair::Bls { .. } => KeyScheme::Bls,
        }
    }

    /// The secp256k1 signing key, for the devp2p scheme only.
    pub fn signing_key(&self) -> Option<&SigningKey> {
        match self {
            KeyPair::Secp256k1Node(signing) => Some(signing),
            _ => None,
        }
    }

    /// The secp256k1 verifying key, for the devp2p scheme only.
    pub fn verifying_key(&self) -> Option<VerifyingKey> {
        self.signing_key().map(|signing| *signing.verifying_key())
    }

    /// The 32-byte secp256k1 private scalar, for the devp2p scheme only.
    pub fn private_scalar(&self) -> Option<[u8; 32]> {
        self.signing_key().map(|signing| signing.to_bytes().into())
    }

    /// The libp2p peer identifier (base58btc multihash of the encoded
    /// public key), for the libp2p schemes only.
    pub fn node_id(&self) -> Option<String> {
        match self {
            KeyPair::Libp2p { keypair, .. } => {
                Some(keypair.public().to_peer_id().to_string())
            }
            _ => None,
        }
    }

    /// Export the private key of a libp2p-scheme keypair in the chosen
    /// encoding.
    pub fn export_private_key(&self, export: Libp2pKeyExport) -> Result<Vec<u8>, KeyGenError> {
        match self {
            KeyPair::Libp2p { keypair, raw, .. } => match export {
                Libp2pKeyExport::Raw => Ok(raw.clone()),
                Libp2pKeyExport::Wrapped => keypair.to_protobuf_encoding().map_err(|e| {
                    KeyGenError::MalformedKeyBytes(format!("protobuf envelope: {}", e))
                }),
            },
            other => Err(KeyGenError::InvalidSchemeParameters(format!(
                "{} keys have no libp2p export encoding",
                other.scheme()
            ))),
        }
    }

    /// The BLS secret scalar bytes, for the BLS scheme only.
    pub fn bls_secret(&self) -> Option<&[u8]> {
        match self {
            KeyPair::Bls { secret, .. } => Some(secret),
            _ => None,
        }
    }

    /// The 48-byte compressed BLS public key, for the BLS scheme only.
    pub fn bls_public(&self) -> Option<&[u8]> {
        match self {
            KeyPair::Bls { public, .. } => Some(public),
            _ => None,
        }
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let public = match self {
            KeyPair::Secp256k1Node(signing) => {
                hex::encode(signing.verifying_key().to_encoded_point(true).as_bytes())
            }
            KeyPair::Libp2p { keypair, .. } => keypair.public().to_peer_id().to_string(),
            KeyPair::Bls { public, .. } => hex::encode(public),
        };
        f.debug_struct("KeyPair")
            .field("scheme", &self.scheme())
            .field("public", &public)
            .finish_non_exhaustive()
    }
}

/// Draw 32-byte candidates until one is a valid secp256k1 scalar.
fn secp256k1_signing_key(stream: &mut EntropyStream) -> Result<SigningKey, KeyGenError> {
    loop {
        let mut candidate = [0u8; 32];
        stream.fill(&mut candidate)?;
        if let Ok(signing) = SigningKey::from_bytes((&candidate).into()) {
            return Ok(signing);
        }
        // Zero or out-of-range scalar; a bounded stream errors on the
        // next fill once it runs dry.
    }
}
