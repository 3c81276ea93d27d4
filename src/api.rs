//! # Boundary API
//!
//! The operations an embedding transport layer calls, with output
//! structs shaped for direct JSON encoding. This crate never writes a
//! response or a log line itself; callers own the wire.
//!
//! Field-name conventions follow the service wire format these outputs
//! feed: node-key responses use camelCase (`publicKey`, `privateKey`,
//! `fullPrivateKey`, `enr`, `seed`), batch keyset entries use snake_case
//! (`validator_key`, `node_id`, `bls_public_key`, ...). Every byte
//! output is lowercase hex without a `0x` prefix except the
//! Ethereum-style address, which always carries one.

use std::net::Ipv4Addr;

use serde::Serialize;

use crate::batch::{self, Keyset};
use crate::entropy::{EntropyStream, RandomnessSpec};
use crate::error::KeyGenError;
use crate::identity::{self, address_of, uncompressed_xy};
use crate::keys::{KeyPair, KeyScheme, Libp2pKeyExport, RsaKeyConfig};
use crate::record::NodeRecord;

/// Bytes of the private-key encoding echoed in the short `privateKey`
/// field; the complete encoding lives in `fullPrivateKey`.
const SHORT_PRIVATE_KEY_LEN: usize = 32;

/// One generated node key, ready for JSON encoding.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeKeyOutput {
    /// Peer identifier for libp2p schemes, 128-char uncompressed public
    /// key hex for the devp2p scheme.
    pub public_key: String,
    pub private_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_private_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// One batch keyset, ready for JSON encoding.
#[derive(Debug, Clone, Serialize)]
pub struct KeysetOutput {
    pub validator_key: String,
    pub validator_address: String,
    pub libp2p_key: String,
    pub node_id: String,
    pub bls_secret_key: String,
    pub bls_public_key: String,
}

/// A key re-derived from raw keystore bytes, ready for JSON encoding.
#[derive(Debug, Clone, Serialize)]
pub struct RecoveredKeyOutput {
    pub address: String,
    pub public_key: String,
    pub private_key: String,
}

/// Generate a libp2p identity key and derive its peer identifier.
pub fn generate_libp2p_node_key(
    scheme: KeyScheme,
    randomness: &RandomnessSpec,
    export: Libp2pKeyExport,
    rsa: &RsaKeyConfig,
) -> Result<NodeKeyOutput, KeyGenError> {
    if !scheme.is_libp2p() {
        return Err(KeyGenError::InvalidSchemeParameters(format!(
            "{} is not a libp2p scheme",
            scheme
        )));
    }

    let mut stream = EntropyStream::new(randomness);
    let pair = KeyPair::generate(scheme, &mut stream, rsa)?;
    let encoded = pair.export_private_key(export)?;
    let short = &encoded[..encoded.len().min(SHORT_PRIVATE_KEY_LEN)];

    Ok(NodeKeyOutput {
        public_key: pair.node_id().expect("libp2p scheme"),
        private_key: hex::encode(short),
        full_private_key: Some(hex::encode(&encoded)),
        address: None,
        enr: None,
        seed: randomness.seed(),
    })
}

/// Generate a devp2p node key, its address, and its discovery record.
pub fn generate_devp2p_node_key(
    ip: Ipv4Addr,
    tcp: u16,
    udp: u16,
    sign: bool,
    randomness: &RandomnessSpec,
) -> Result<NodeKeyOutput, KeyGenError> {
    let mut stream = EntropyStream::new(randomness);
    let pair = KeyPair::generate(KeyScheme::Secp256k1Node, &mut stream, &RsaKeyConfig::default())?;

    let public = pair.verifying_key().expect("secp256k1 scheme");
    let mut record = NodeRecord::new(public, ip, tcp, udp);
    if sign {
        record = record.sign(&pair)?;
    }

    Ok(NodeKeyOutput {
        public_key: hex::encode(uncompressed_xy(&public)),
        private_key: hex::encode(pair.private_scalar().expect("secp256k1 scheme")),
        full_private_key: None,
        address: Some(address_of(&public).to_string()),
        enr: Some(record.serialize()),
        seed: randomness.seed(),
    })
}

/// Generate `count` independent keysets.
pub fn generate_batch(
    count: usize,
    randomness: &RandomnessSpec,
) -> Result<Vec<Keyset>, KeyGenError> {
    batch::generate_keysets(count, randomness)
}

/// Consensus-membership projection of a batch.
pub fn project_membership(keysets: &[Keyset]) -> Vec<String> {
    batch::membership_strings(keysets)
}

/// Bootstrap-multiaddress projection of a batch.
pub fn project_bootstrap(
    ips: &[String],
    keysets: &[Keyset],
) -> Result<Vec<String>, KeyGenError> {
    batch::bootstrap_strings(ips, keysets)
}

/// JSON-ready view of a batch.
pub fn keyset_outputs(keysets: &[Keyset]) -> Vec<KeysetOutput> {
    keysets
        .iter()
        .map(|keyset| KeysetOutput {
            validator_key: hex::encode(
                keyset.validator.private_scalar().expect("secp256k1 scheme"),
            ),
            validator_address: keyset.validator_address.to_string(),
            libp2p_key: hex::encode(
                keyset
                    .libp2p
                    .export_private_key(Libp2pKeyExport::Raw)
                    .expect("libp2p scheme"),
            ),
            node_id: keyset.node_id.clone(),
            bls_secret_key: hex::encode(keyset.bls.bls_secret().expect("bls scheme")),
            bls_public_key: keyset.bls_public_hex.clone(),
        })
        .collect()
}

/// Re-derive address and public key from raw keystore private-key
/// bytes.
pub fn recover_raw_private_key(bytes: &[u8]) -> Result<RecoveredKeyOutput, KeyGenError> {
    let recovered = identity::recover_from_raw_private_key(bytes)?;
    Ok(RecoveredKeyOutput {
        address: recovered.address.to_string(),
        public_key: hex::encode(recovered.public_xy),
        private_key: hex::encode(recovered.private_key),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn libp2p_output_field_names_and_seed_echo() {
        let output = generate_libp2p_node_key(
            KeyScheme::Libp2pEd25519,
            &RandomnessSpec::Seeded { seed: 42 },
            Libp2pKeyExport::Raw,
            &RsaKeyConfig::default(),
        )
        .unwrap();

        let json = serde_json::to_value(&output).unwrap();
        assert!(json.get("publicKey").is_some());
        assert!(json.get("privateKey").is_some());
        assert!(json.get("fullPrivateKey").is_some());
        assert_eq!(json.get("seed").unwrap(), 42);
        // devp2p-only fields stay out of libp2p output.
        assert!(json.get("address").is_none());
        assert!(json.get("enr").is_none());
    }

    #[test]
    fn secure_generation_omits_the_seed_echo() {
        let output = generate_libp2p_node_key(
            KeyScheme::Libp2pSecp256k1,
            &RandomnessSpec::Secure,
            Libp2pKeyExport::Raw,
            &RsaKeyConfig::default(),
        )
        .unwrap();

        let json = serde_json::to_value(&output).unwrap();
        assert!(json.get("seed").is_none());
    }

    #[test]
    fn short_private_key_is_a_32_byte_prefix() {
        let output = generate_libp2p_node_key(
            KeyScheme::Libp2pEd25519,
            &RandomnessSpec::Seeded { seed: 7 },
            Libp2pKeyExport::Raw,
            &RsaKeyConfig::default(),
        )
        .unwrap();

        let full = output.full_private_key.unwrap();
        assert_eq!(output.private_key.len(), 64);
        assert_eq!(full.len(), 128);
        assert!(full.starts_with(&output.private_key));
    }

    #[test]
    fn libp2p_rejects_non_libp2p_schemes() {
        for scheme in [KeyScheme::Secp256k1Node, KeyScheme::Bls] {
            assert!(matches!(
                generate_libp2p_node_key(
                    scheme,
                    &RandomnessSpec::Secure,
                    Libp2pKeyExport::Raw,
                    &RsaKeyConfig::default(),
                ),
                Err(KeyGenError::InvalidSchemeParameters(_))
            ));
        }
    }

    #[test]
    fn devp2p_output_shape() {
        let output = generate_devp2p_node_key(
            Ipv4Addr::new(10, 0, 0, 1),
            30303,
            30303,
            false,
            &RandomnessSpec::Secure,
        )
        .unwrap();

        assert_eq!(output.public_key.len(), 128);
        assert_eq!(output.private_key.len(), 64);
        assert!(output.address.as_ref().unwrap().starts_with("0x"));
        assert!(output.enr.as_ref().unwrap().starts_with("enode://"));
        assert!(output.full_private_key.is_none());
    }

    #[test]
    fn devp2p_signed_record_is_an_enr() {
        let output = generate_devp2p_node_key(
            Ipv4Addr::new(10, 0, 0, 1),
            30303,
            30301,
            true,
            &RandomnessSpec::Secure,
        )
        .unwrap();
        assert!(output.enr.unwrap().starts_with("enr:"));
    }

    #[test]
    fn devp2p_seeded_generation_is_deterministic() {
        let spec = RandomnessSpec::Seeded { seed: 42 };
        let a = generate_devp2p_node_key(Ipv4Addr::new(10, 0, 0, 1), 1, 1, true, &spec).unwrap();
        let b = generate_devp2p_node_key(Ipv4Addr::new(10, 0, 0, 1), 1, 1, true, &spec).unwrap();

        assert_eq!(a.private_key, b.private_key);
        assert_eq!(a.public_key, b.public_key);
        assert_eq!(a.address, b.address);
        assert_eq!(a.enr, b.enr);
    }

    #[test]
    fn keyset_outputs_mirror_the_batch() {
        let keysets = generate_batch(2, &RandomnessSpec::Secure).unwrap();
        let outputs = keyset_outputs(&keysets);

        assert_eq!(outputs.len(), 2);
        for (output, keyset) in outputs.iter().zip(&keysets) {
            assert_eq!(output.node_id, keyset.node_id);
            assert_eq!(output.validator_address, keyset.validator_address.to_string());
            assert_eq!(output.bls_public_key, keyset.bls_public_hex);
            assert_eq!(output.validator_key.len(), 64);
            assert_eq!(output.libp2p_key.len(), 64);
            assert_eq!(output.bls_secret_key.len(), 64);
            assert_eq!(output.bls_public_key.len(), 96);
        }

        let json = serde_json::to_value(&outputs[0]).unwrap();
        for field in [
            "validator_key",
            "validator_address",
            "libp2p_key",
            "node_id",
            "bls_secret_key",
            "bls_public_key",
        ] {
            assert!(json.get(field).is_some(), "missing field {}", field);
        }
    }

    #[test]
    fn recovery_output_uses_the_shared_address_rule() {
        let mut scalar = [0u8; 32];
        scalar[31] = 1;
        let output = recover_raw_private_key(&scalar).unwrap();

        assert_eq!(output.address, "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf");
        assert_eq!(output.public_key.len(), 128);
        assert_eq!(output.private_key, hex::encode(scalar));
    }
}
