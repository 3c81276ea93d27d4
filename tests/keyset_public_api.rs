//! Integration tests for the keymint public API.
//!
//! These tests exercise the public surface end to end: batch generation
//! with both projections, devp2p record generation, every libp2p key
//! type, and the keystore-recovery path.

use std::net::Ipv4Addr;

use keymint::{
    generate_batch, generate_devp2p_node_key, generate_libp2p_node_key, project_bootstrap,
    project_membership, recover_raw_private_key, KeyGenError, KeyScheme, Libp2pKeyExport,
    RandomnessSpec, RsaKeyConfig, BOOTSTRAP_TCP_PORT,
};

fn ips(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn assert_lower_hex(s: &str, expected_len: usize) {
    assert_eq!(s.len(), expected_len, "unexpected hex length for {}", s);
    assert!(
        s.chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()),
        "expected lowercase hex, got {}",
        s
    );
}

#[test]
fn batch_with_bootstrap_projection() {
    // Three keysets, two IPs: exactly two multiaddresses, built from the
    // first two keysets in order.
    let keysets = generate_batch(3, &RandomnessSpec::Secure).expect("batch generation failed");
    assert_eq!(keysets.len(), 3);

    let bootstrap =
        project_bootstrap(&ips(&["10.0.0.1", "10.0.0.2"]), &keysets).expect("projection failed");

    assert_eq!(bootstrap.len(), 2);
    assert_eq!(
        bootstrap[0],
        format!("/ip4/10.0.0.1/tcp/{}/p2p/{}", BOOTSTRAP_TCP_PORT, keysets[0].node_id)
    );
    assert_eq!(
        bootstrap[1],
        format!("/ip4/10.0.0.2/tcp/{}/p2p/{}", BOOTSTRAP_TCP_PORT, keysets[1].node_id)
    );
}

#[test]
fn batch_membership_projection() {
    let keysets = generate_batch(2, &RandomnessSpec::Secure).expect("batch generation failed");
    let membership = project_membership(&keysets);

    assert_eq!(membership.len(), 2);
    for entry in &membership {
        let (address, bls) = entry.split_once(':').expect("entry must contain a colon");
        assert!(address.starts_with("0x"));
        assert_lower_hex(&address[2..], 40);
        assert_lower_hex(bls, 96);
    }
}

#[test]
fn bootstrap_rejects_more_ips_than_keysets() {
    let keysets = generate_batch(1, &RandomnessSpec::Secure).expect("batch generation failed");

    let err = project_bootstrap(&ips(&["10.0.0.1", "10.0.0.2", "10.0.0.3"]), &keysets)
        .expect_err("surplus IPs must be rejected");
    assert!(matches!(
        err,
        KeyGenError::TooManyAddresses { ips: 3, keysets: 1 }
    ));
}

#[test]
fn devp2p_unsigned_and_signed_records() {
    let unsigned = generate_devp2p_node_key(
        Ipv4Addr::new(192, 168, 0, 1),
        30303,
        30303,
        false,
        &RandomnessSpec::Secure,
    )
    .expect("devp2p generation failed");

    assert_lower_hex(&unsigned.public_key, 128);
    assert_lower_hex(&unsigned.private_key, 64);
    let enr = unsigned.enr.expect("record must always be present");
    assert!(enr.starts_with("enode://"));
    assert!(enr.contains("@192.168.0.1:30303"));

    let signed = generate_devp2p_node_key(
        Ipv4Addr::new(192, 168, 0, 1),
        30303,
        30303,
        true,
        &RandomnessSpec::Secure,
    )
    .expect("devp2p generation failed");
    assert!(signed.enr.expect("record must always be present").starts_with("enr:"));
}

#[test]
fn devp2p_address_matches_recovery() {
    // The address reported at generation time and the address recovered
    // from the emitted private key are the same, bit for bit.
    let generated = generate_devp2p_node_key(
        Ipv4Addr::new(10, 0, 0, 1),
        30303,
        30303,
        false,
        &RandomnessSpec::Secure,
    )
    .expect("devp2p generation failed");

    let private = hex::decode(&generated.private_key).expect("hex private key");
    let recovered = recover_raw_private_key(&private).expect("recovery failed");

    assert_eq!(generated.address.unwrap(), recovered.address);
    assert_eq!(generated.public_key, recovered.public_key);
}

#[test]
fn libp2p_key_types_yield_distinct_peer_id_shapes() {
    let config = RsaKeyConfig::default();

    let ed25519 = generate_libp2p_node_key(
        KeyScheme::Libp2pEd25519,
        &RandomnessSpec::Secure,
        Libp2pKeyExport::Raw,
        &config,
    )
    .expect("ed25519 generation failed");
    assert!(ed25519.public_key.starts_with("12D3Koo"));

    let secp256k1 = generate_libp2p_node_key(
        KeyScheme::Libp2pSecp256k1,
        &RandomnessSpec::Secure,
        Libp2pKeyExport::Raw,
        &config,
    )
    .expect("secp256k1 generation failed");
    assert!(secp256k1.public_key.starts_with("16Uiu2H"));
}

#[test]
fn libp2p_seeded_generation_is_reproducible() {
    let spec = RandomnessSpec::Seeded { seed: 1234 };
    let config = RsaKeyConfig::default();

    let a = generate_libp2p_node_key(
        KeyScheme::Libp2pEd25519,
        &spec,
        Libp2pKeyExport::Raw,
        &config,
    )
    .expect("generation failed");
    let b = generate_libp2p_node_key(
        KeyScheme::Libp2pEd25519,
        &spec,
        Libp2pKeyExport::Raw,
        &config,
    )
    .expect("generation failed");

    assert_eq!(a.public_key, b.public_key);
    assert_eq!(a.private_key, b.private_key);
    assert_eq!(a.full_private_key, b.full_private_key);
    assert_eq!(a.seed, Some(1234));
}

#[test]
fn libp2p_wrapped_export_is_reproducible_and_distinct() {
    let spec = RandomnessSpec::Seeded { seed: 99 };
    let config = RsaKeyConfig::default();

    let raw = generate_libp2p_node_key(
        KeyScheme::Libp2pSecp256k1,
        &spec,
        Libp2pKeyExport::Raw,
        &config,
    )
    .expect("generation failed");
    let wrapped = generate_libp2p_node_key(
        KeyScheme::Libp2pSecp256k1,
        &spec,
        Libp2pKeyExport::Wrapped,
        &config,
    )
    .expect("generation failed");

    // Same key, different private-key encoding.
    assert_eq!(raw.public_key, wrapped.public_key);
    assert_ne!(raw.full_private_key, wrapped.full_private_key);
}

#[test]
fn seeded_rsa_reports_exhaustion() {
    let err = generate_libp2p_node_key(
        KeyScheme::Libp2pRsa,
        &RandomnessSpec::Seeded { seed: 1 },
        Libp2pKeyExport::Raw,
        &RsaKeyConfig::default(),
    )
    .expect_err("seeded RSA must fail");
    assert!(matches!(err, KeyGenError::RandomSourceExhausted { .. }));
}

#[test]
fn recovery_known_vector() {
    let mut scalar = [0u8; 32];
    scalar[31] = 1;

    let output = recover_raw_private_key(&scalar).expect("recovery failed");
    assert_eq!(output.address, "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf");
    assert_lower_hex(&output.public_key, 128);
    assert_eq!(output.private_key, hex::encode(scalar));
}

#[test]
fn recovery_rejects_garbage() {
    assert!(recover_raw_private_key(&[1, 2, 3]).is_err());
    assert!(recover_raw_private_key(&[0u8; 32]).is_err());
}
