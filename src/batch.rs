//! # Batch Orchestrator
//!
//! Generates N independent keysets, each holding one secp256k1 validator
//! key, one libp2p secp256k1 identity key, and one BLS consensus key,
//! and projects a batch into the two string formats downstream tooling
//! consumes: a consensus-membership list and a bootstrap-node address
//! list.
//!
//! Batches are index-stable. Position is the only correlation key the
//! projections use, so generation is strictly sequential and keysets
//! never share entropy: every sub-key comes from its own draw on the
//! call's entropy stream, and consecutive draws on a stream are
//! disjoint. A seeded stream holds 64 bytes while a full keyset consumes
//! 96, so seeded batch generation of one or more keysets reports
//! `RandomSourceExhausted`; deterministic fixtures should seed
//! single-scheme generation instead.

use crate::entropy::{EntropyStream, RandomnessSpec};
use crate::error::KeyGenError;
use crate::identity::{address_of, bls_pubkey_hex, EthAddress};
use crate::keys::{KeyPair, KeyScheme, RsaKeyConfig};

/// TCP port baked into bootstrap multiaddresses.
pub const BOOTSTRAP_TCP_PORT: u16 = 1478;

/// One batch slot: a validator key, a network-identity key, and a
/// consensus key generated together, plus their derived identifiers.
#[derive(Debug, Clone)]
pub struct Keyset {
    /// secp256k1 validator keypair.
    pub validator: KeyPair,
    pub validator_address: EthAddress,
    /// libp2p secp256k1 identity keypair.
    pub libp2p: KeyPair,
    pub node_id: String,
    /// BLS consensus keypair.
    pub bls: KeyPair,
    pub bls_public_hex: String,
}

/// Generate `count` independent keysets.
///
/// Order is preserved; `keysets[i]` is the i-th generated slot. The
/// three sub-keys of every slot come from independent draws on one
/// stream, in validator, libp2p, BLS order.
pub fn generate_keysets(
    count: usize,
    randomness: &RandomnessSpec,
) -> Result<Vec<Keyset>, KeyGenError> {
    let rsa = RsaKeyConfig::default();
    let mut stream = EntropyStream::new(randomness);
    let mut keysets = Vec::with_capacity(count);

    for _ in 0..count {
        let validator = KeyPair::generate(KeyScheme::Secp256k1Node, &mut stream, &rsa)?;
        let validator_address = address_of(&validator.verifying_key().expect("secp256k1 scheme"));

        let libp2p = KeyPair::generate(KeyScheme::Libp2pSecp256k1, &mut stream, &rsa)?;
        let node_id = libp2p.node_id().expect("libp2p scheme");

        let bls = KeyPair::generate(KeyScheme::Bls, &mut stream, &rsa)?;
        let bls_public_hex = bls_pubkey_hex(bls.bls_public().expect("bls scheme"));

        keysets.push(Keyset {
            validator,
            validator_address,
            libp2p,
            node_id,
            bls,
            bls_public_hex,
        });
    }

    Ok(keysets)
}

/// Project a batch into consensus-membership strings, one
/// `<address>:<bls-public-hex>` entry per keyset, order-preserving.
pub fn membership_strings(keysets: &[Keyset]) -> Vec<String> {
    keysets
        .iter()
        .map(|keyset| format!("{}:{}", keyset.validator_address, keyset.bls_public_hex))
        .collect()
}

/// Project a batch into bootstrap-node multiaddresses by pairing
/// `ips[i]` with `keysets[i]`.
///
/// Fails with `TooManyAddresses` when there are more IPs than keysets;
/// surplus keysets are ignored.
pub fn bootstrap_strings(
    ips: &[String],
    keysets: &[Keyset],
) -> Result<Vec<String>, KeyGenError> {
    if ips.len() > keysets.len() {
        return Err(KeyGenError::TooManyAddresses {
            ips: ips.len(),
            keysets: keysets.len(),
        });
    }

    Ok(ips
        .iter()
        .zip(keysets)
        .map(|(ip, keyset)| {
            format!(
                "/ip4/{}/tcp/{}/p2p/{}",
                ip, BOOTSTRAP_TCP_PORT, keyset.node_id
            )
        })
        .collect())
}
