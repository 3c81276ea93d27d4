//! # Node Record Builder
//!
//! Constructs discovery records for secp256k1 network identities and
//! serializes them in the two field formats other nodes consume:
//!
//! - **Unsigned** records render as enode URLs,
//!   `enode://<128-hex-pubkey>@<ip>:<tcp>[?discport=<udp>]`
//! - **Signed** records render as EIP-778 ENRs,
//!   `enr:<base64url(rlp(record))>` with no padding
//!
//! ## Record Format
//!
//! The binary layout is the EIP-778 "v4" identity scheme, chosen because
//! it is what discovery peers in the field parse. The RLP content list is
//! `[seq, "id", "v4", "ip", ip4, "secp256k1", compressed-pubkey, "tcp",
//! tcp, "udp", udp]` with key/value pairs in sorted key order. The
//! signature is ECDSA over Keccak-256 of the content list, encoded as
//! 64 bytes r‖s in the low-s form.
//!
//! ## State Machine
//!
//! A record is **Unsigned** at construction and becomes **Signed** once;
//! there are no further transitions. [`NodeRecord::sign`] returns a new
//! signed record bound to the signing key's public key (the signer's key
//! replaces the constructed one, as the v4 scheme requires) and leaves
//! the original untouched. An unsigned serialization is never
//! verifiable; callers that need authenticity must check
//! [`NodeRecord::verify`].

use std::net::Ipv4Addr;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use k256::ecdsa::{Signature, VerifyingKey};
use sha3::{Digest, Keccak256};

use crate::error::KeyGenError;
use crate::identity::uncompressed_xy;
use crate::keys::{KeyPair, KeyScheme};

/// Sequence number assigned to freshly constructed records.
pub const ENR_SEQ_INITIAL: u64 = 1;

/// Identity-scheme name carried in the record's `id` pair.
const ENR_ID_SCHEME: &[u8] = b"v4";

/// A discovery record: public key plus network location, optionally
/// signed with the matching private key.
#[derive(Clone, Debug)]
pub struct NodeRecord {
    public: VerifyingKey,
    ip: Ipv4Addr,
    tcp: u16,
    udp: u16,
    seq: u64,
    signature: Option<Vec<u8>>,
}

impl NodeRecord {
    /// Construct an unsigned record.
    pub fn new(public: VerifyingKey, ip: Ipv4Addr, tcp: u16, udp: u16) -> Self {
        Self {
            public,
            ip,
            tcp,
            udp,
            seq: ENR_SEQ_INITIAL,
            signature: None,
        }
    }

    pub fn public(&self) -> &VerifyingKey {
        &self.public
    }

    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    /// Sign the record's canonical serialization.
    ///
    /// Fails with `SchemeMismatch` unless `keypair` is a secp256k1 node
    /// key. The returned record carries the signer's public key in its
    /// `secp256k1` pair, so the embedded key always matches the
    /// signature.
    pub fn sign(&self, keypair: &KeyPair) -> Result<NodeRecord, KeyGenError> {
        let signing = keypair.signing_key().ok_or(KeyGenError::SchemeMismatch {
            expected: KeyScheme::Secp256k1Node,
            actual: keypair.scheme(),
        })?;

        let mut signed = NodeRecord {
            public: *signing.verifying_key(),
            ip: self.ip,
            tcp: self.tcp,
            udp: self.udp,
            seq: self.seq,
            signature: None,
        };

        let digest = signed.signing_digest();
        let signature: Signature = signing.sign_prehash(&digest).map_err(|e| {
            KeyGenError::MalformedKeyBytes(format!("record signing failed: {}", e))
        })?;
        // The v4 scheme accepts only the low-s form.
        let signature = signature.normalize_s().unwrap_or(signature);

        signed.signature = Some(signature.to_bytes().to_vec());
        Ok(signed)
    }

    /// Verify the embedded signature against the embedded public key.
    pub fn verify(&self) -> bool {
        self.verify_with(&self.public)
    }

    /// Verify the embedded signature against an arbitrary public key.
    pub fn verify_with(&self, public: &VerifyingKey) -> bool {
        let Some(sig_bytes) = &self.signature else {
            return false;
        };
        let Ok(signature) = Signature::from_slice(sig_bytes) else {
            return false;
        };
        public
            .verify_prehash(&self.signing_digest(), &signature)
            .is_ok()
    }

    /// Render the record as its canonical textual form: an enode URL
    /// while unsigned, an `enr:` string once signed.
    pub fn serialize(&self) -> String {
        match &self.signature {
            None => self.enode_url(),
            Some(signature) => self.enr_text(signature),
        }
    }

    fn enode_url(&self) -> String {
        let xy = uncompressed_xy(&self.public);
        let mut url = format!("enode://{}@{}:{}", hex::encode(xy), self.ip, self.tcp);
        if self.udp != self.tcp {
            url.push_str(&format!("?discport={}", self.udp));
        }
        url
    }

    fn enr_text(&self, signature: &[u8]) -> String {
        let mut payload = Vec::new();
        rlp_bytes(&mut payload, signature);
        payload.extend_from_slice(&self.content_payload());
        format!("enr:{}", URL_SAFE_NO_PAD.encode(rlp_list(&payload)))
    }

    /// RLP items of the content list: seq followed by the key/value
    /// pairs in sorted key order.
    fn content_payload(&self) -> Vec<u8> {
        let compressed = self.public.to_encoded_point(true);
        let mut payload = Vec::new();
        rlp_uint(&mut payload, self.seq);
        rlp_bytes(&mut payload, b"id");
        rlp_bytes(&mut payload, ENR_ID_SCHEME);
        rlp_bytes(&mut payload, b"ip");
        rlp_bytes(&mut payload, &self.ip.octets());
        rlp_bytes(&mut payload, b"secp256k1");
        rlp_bytes(&mut payload, compressed.as_bytes());
        rlp_bytes(&mut payload, b"tcp");
        rlp_uint(&mut payload, self.tcp as u64);
        rlp_bytes(&mut payload, b"udp");
        rlp_uint(&mut payload, self.udp as u64);
        payload
    }

    fn signing_digest(&self) -> [u8; 32] {
        Keccak256::digest(rlp_list(&self.content_payload())).into()
    }
}

// ----------------------------------------------------------------------
// Minimal canonical RLP encoding (byte strings and unsigned integers)
// ----------------------------------------------------------------------

fn rlp_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    if bytes.len() == 1 && bytes[0] < 0x80 {
        out.push(bytes[0]);
    } else {
        rlp_length(out, bytes.len(), 0x80);
        out.extend_from_slice(bytes);
    }
}

/// Integers encode as their minimal big-endian bytes; zero encodes as
/// the empty string.
fn rlp_uint(out: &mut Vec<u8>, value: u64) {
    let be = value.to_be_bytes();
    let start = be.iter().position(|&b| b != 0).unwrap_or(8);
    rlp_bytes(out, &be[start..]);
}

fn rlp_length(out: &mut Vec<u8>, len: usize, offset: u8) {
    if len < 56 {
        out.push(offset + len as u8);
    } else {
        let be = (len as u64).to_be_bytes();
        let start = be.iter().position(|&b| b != 0).unwrap_or(8);
        out.push(offset + 55 + (8 - start) as u8);
        out.extend_from_slice(&be[start..]);
    }
}

fn rlp_list(payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 9);
    rlp_length(&mut out, payload.len(), 0xc0);
    out.extend_from_slice(payload);
    out
}
