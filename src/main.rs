use std::net::Ipv4Addr;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use keymint::{
    generate_batch, generate_devp2p_node_key, generate_libp2p_node_key, keyset_outputs,
    project_bootstrap, project_membership, recover_raw_private_key, KeyScheme, Libp2pKeyExport,
    RandomnessSpec, RsaKeyConfig,
};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Libp2pKeyType {
    Rsa,
    Ed25519,
    Secp256k1,
}

impl From<Libp2pKeyType> for KeyScheme {
    fn from(key_type: Libp2pKeyType) -> Self {
        match key_type {
            Libp2pKeyType::Rsa => KeyScheme::Libp2pRsa,
            Libp2pKeyType::Ed25519 => KeyScheme::Libp2pEd25519,
            Libp2pKeyType::Secp256k1 => KeyScheme::Libp2pSecp256k1,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "keymint")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a devp2p node key and its discovery record.
    Devp2p {
        #[arg(long, default_value = "127.0.0.1")]
        ip: Ipv4Addr,
        #[arg(long, default_value = "30303")]
        tcp: u16,
        #[arg(long, default_value = "30303")]
        udp: u16,
        /// Sign the record; unsigned records serialize as enode URLs.
        #[arg(long)]
        sign: bool,
        /// Deterministic 64-bit seed instead of the OS CSPRNG.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Generate a libp2p identity key and its peer ID.
    Libp2p {
        #[arg(long, value_enum, default_value = "ed25519")]
        key_type: Libp2pKeyType,
        /// Export the private key as the self-describing protobuf
        /// envelope instead of the scheme-native layout.
        #[arg(long)]
        protobuf: bool,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Generate validator keysets with membership and bootstrap
    /// projections.
    Keysets {
        #[arg(long, default_value = "1")]
        count: usize,
        /// IPs to pair with keysets, one bootstrap entry each.
        #[arg(long = "ip", value_name = "IP")]
        ips: Vec<String>,
    },
    /// Re-derive address and public key from a raw private key.
    Recover {
        /// 32-byte secp256k1 private key, hex encoded.
        #[arg(long)]
        private_key: String,
    },
}

fn randomness(seed: Option<u64>) -> RandomnessSpec {
    match seed {
        Some(seed) => RandomnessSpec::Seeded { seed },
        None => RandomnessSpec::Secure,
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Command::Devp2p {
            ip,
            tcp,
            udp,
            sign,
            seed,
        } => {
            let output = generate_devp2p_node_key(ip, tcp, udp, sign, &randomness(seed))
                .context("devp2p key generation failed")?;
            info!(address = %output.address.as_deref().unwrap_or(""), "generated devp2p node key");
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::Libp2p {
            key_type,
            protobuf,
            seed,
        } => {
            let export = if protobuf {
                Libp2pKeyExport::Wrapped
            } else {
                Libp2pKeyExport::Raw
            };
            let output = generate_libp2p_node_key(
                key_type.into(),
                &randomness(seed),
                export,
                &RsaKeyConfig::default(),
            )
            .context("libp2p key generation failed")?;
            info!(peer_id = %output.public_key, "generated libp2p node key");
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::Keysets { count, ips } => {
            let keysets = generate_batch(count, &RandomnessSpec::Secure)
                .context("keyset generation failed")?;
            info!(count = keysets.len(), "generated keysets");

            let membership = project_membership(&keysets);
            let bootstrap = if ips.is_empty() {
                Vec::new()
            } else {
                project_bootstrap(&ips, &keysets).context("bootstrap projection failed")?
            };

            let output = serde_json::json!({
                "keys": keyset_outputs(&keysets),
                "membership": membership,
                "bootnodes": bootstrap,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::Recover { private_key } => {
            let bytes = hex::decode(private_key.trim_start_matches("0x"))
                .context("private key must be hex encoded")?;
            let output =
                recover_raw_private_key(&bytes).context("private key recovery failed")?;
            info!(address = %output.address, "recovered key");
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
