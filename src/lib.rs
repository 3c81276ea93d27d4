//! # keymint - Node Key Material Generation and Derivation
//!
//! keymint produces cryptographic keypairs for the unrelated key
//! algebras a blockchain node deployment needs, and derives every
//! externally-visible identifier that hangs off a keypair:
//!
//! - **Schemes**: secp256k1 devp2p node keys, libp2p identity keys
//!   (RSA / Ed25519 / secp256k1), BLS12-381 validator keys
//! - **Identifiers**: libp2p peer IDs, Ethereum-style addresses
//!   (Keccak-256, low 20 bytes), BLS public key hex
//! - **Records**: EIP-778 node discovery records, signed or unsigned
//! - **Batches**: N-keyset generation with consensus-membership and
//!   bootstrap-multiaddress projections
//!
//! ## Design
//!
//! Every call is a pure function of its inputs plus the chosen
//! randomness source; no key is retained after a call returns, no global
//! state participates in derivation, and the whole crate is safely
//! callable from any number of threads without locking. Randomness is
//! either the OS CSPRNG or a deterministic 64-byte stream expanded from
//! a 64-bit seed for reproducible fixtures.
//!
//! ## Module Overview
//!
//! | Module | Purpose |
//! |--------|--------|
//! | `entropy` | Secure and seeded randomness streams |
//! | `keys` | Scheme adapters producing `KeyPair` values |
//! | `identity` | Address, peer-ID, and BLS identifier derivation |
//! | `record` | Discovery record construction, signing, serialization |
//! | `batch` | Keyset batches and their two projections |
//! | `api` | Boundary operations with JSON-ready outputs |
//! | `error` | The `KeyGenError` kinds every path reports |

mod api;
mod batch;
mod entropy;
mod error;
mod identity;
mod keys;
mod record;

pub use api::{
    generate_batch, generate_devp2p_node_key, generate_libp2p_node_key, keyset_outputs,
    project_bootstrap, project_membership, recover_raw_private_key, KeysetOutput, NodeKeyOutput,
    RecoveredKeyOutput,
};
pub use batch::{
    bootstrap_strings, generate_keysets, membership_strings, Keyset, BOOTSTRAP_TCP_PORT,
};
pub use entropy::{EntropyStream, RandomnessSpec, SEEDED_STREAM_LEN};
pub use error::KeyGenError;
pub use identity::{
    address_of, bls_pubkey_hex, eth_address, recover_from_raw_private_key, uncompressed_xy,
    EthAddress, RecoveredKey,
};
pub use keys::{
    KeyPair, KeyScheme, Libp2pKeyExport, RsaKeyConfig, RSA_KEYPAIR_BITS, RSA_KEYPAIR_EXPONENT,
};
pub use record::{NodeRecord, ENR_SEQ_INITIAL};
