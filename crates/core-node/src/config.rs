//! Aggregate engine configuration: one nested struct per subsystem,
//! composed the way `NodeConfig` composes `node-runtime`'s subsystem
//! sections, loadable from TOML at the binary edge.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Complete configuration for one `Engine` instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// EIP-155 chain id folded into transaction signatures. Votes and DAG
    /// blocks always sign with `chain_id = 0` regardless of this value.
    pub chain_id: u64,
    /// Root directory this node's data belongs under. `storage.path` is
    /// configured independently and is what `ColumnStore::open` actually
    /// reads from.
    pub data_dir: PathBuf,
    pub pbft: pbft_engine::PbftConfig,
    pub dag: dag_engine::DagConfig,
    pub vote_manager: vote_manager::VoteManagerConfig,
    pub finalizer: period_finalizer::FinalizerConfig,
    pub sortition: sync_queue::SortitionControllerConfig,
    pub storage: core_storage::StorageConfig,
    pub telemetry: core_telemetry::TelemetryConfig,
    pub dpos: DposConfig,
    pub keystore: KeystoreConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chain_id: 1,
            data_dir: PathBuf::from("./data"),
            pbft: pbft_engine::PbftConfig::default(),
            dag: dag_engine::DagConfig::default(),
            vote_manager: vote_manager::VoteManagerConfig::default(),
            finalizer: period_finalizer::FinalizerConfig::default(),
            sortition: sync_queue::SortitionControllerConfig::default(),
            storage: core_storage::StorageConfig::default(),
            telemetry: core_telemetry::TelemetryConfig::default(),
            dpos: DposConfig::default(),
            keystore: KeystoreConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load from a TOML file, validating every nested section.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|err| anyhow::anyhow!("reading config {}: {err}", path.display()))?;
        let config: Self = toml::from_str(&raw)
            .map_err(|err| anyhow::anyhow!("parsing config {}: {err}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.pbft.validate().map_err(|e| anyhow::anyhow!(e))?;
        self.dag.validate().map_err(|e| anyhow::anyhow!(e))?;
        self.vote_manager.validate().map_err(|e| anyhow::anyhow!(e))?;
        self.finalizer.validate().map_err(|e| anyhow::anyhow!(e))?;
        self.sortition.validate().map_err(|e| anyhow::anyhow!(e))?;
        self.dpos.validate().map_err(|e| anyhow::anyhow!(e))?;
        if self.chain_id == 0 {
            anyhow::bail!("chain_id must be non-zero");
        }
        Ok(())
    }
}

/// `dpos.*`: the genesis validator set this build pins in place of the
/// real DPoS state-transition collaborator (out of scope). Balances and
/// VRF keys are fixed at genesis and never move — the adapters built from
/// this section are a deliberate placeholder, documented in `DESIGN.md`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DposConfig {
    pub deposit_delay: u64,
    pub withdrawal_delay: u64,
    pub eligibility_balance_threshold: u64,
    pub vote_eligibility_balance_step: u64,
    pub genesis_validators: Vec<GenesisValidator>,
}

impl Default for DposConfig {
    fn default() -> Self {
        Self {
            deposit_delay: 5,
            withdrawal_delay: 5,
            eligibility_balance_threshold: 1_000_000,
            vote_eligibility_balance_step: 1_000_000,
            genesis_validators: Vec::new(),
        }
    }
}

impl DposConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.vote_eligibility_balance_step == 0 {
            anyhow::bail!("dpos.vote_eligibility_balance_step must be non-zero");
        }
        for validator in &self.genesis_validators {
            validator.address_bytes()?;
            validator.vrf_public_key_decoded()?;
        }
        Ok(())
    }
}

/// One genesis validator entry: hex-encoded address and VRF public key,
/// a starting balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenesisValidator {
    pub address: String,
    pub balance: u64,
    pub vrf_public_key: String,
}

impl GenesisValidator {
    pub fn address_bytes(&self) -> anyhow::Result<core_types::Address> {
        decode_fixed_hex(&self.address)
    }

    pub fn vrf_public_key_decoded(&self) -> anyhow::Result<core_crypto::vrf::VrfPublicKey> {
        let bytes: [u8; 32] = decode_fixed_hex(&self.vrf_public_key)?;
        core_crypto::vrf::VrfPublicKey::from_bytes(&bytes)
            .map_err(|err| anyhow::anyhow!("invalid genesis vrf public key: {err}"))
    }
}

fn decode_fixed_hex<const N: usize>(value: &str) -> anyhow::Result<[u8; N]> {
    let trimmed = value.strip_prefix("0x").unwrap_or(value);
    if trimmed.len() != N * 2 {
        anyhow::bail!("expected {} hex chars, got {}", N * 2, trimmed.len());
    }
    let mut out = [0u8; N];
    for (index, byte) in out.iter_mut().enumerate() {
        let slice = &trimmed[index * 2..index * 2 + 2];
        *byte = u8::from_str_radix(slice, 16).map_err(|err| anyhow::anyhow!("invalid hex byte: {err}"))?;
    }
    Ok(out)
}

/// Signing keys for this node. `None` means "generate an ephemeral
/// keypair at bootstrap" — fine for a single development run, useless
/// across restarts, never suitable for a real validator identity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeystoreConfig {
    pub secp256k1_secret_hex: Option<String>,
    pub vrf_secret_hex: Option<String>,
}

impl KeystoreConfig {
    pub fn load_or_generate_secp256k1(&self) -> anyhow::Result<core_crypto::ecdsa::Secp256k1KeyPair> {
        match &self.secp256k1_secret_hex {
            Some(hex) => {
                let bytes: [u8; 32] = decode_fixed_hex(hex)?;
                core_crypto::ecdsa::Secp256k1KeyPair::from_bytes(bytes)
                    .map_err(|err| anyhow::anyhow!("invalid keystore secp256k1 secret: {err}"))
            }
            None => {
                tracing::warn!("no keystore.secp256k1_secret_hex configured, generating an ephemeral signing key");
                Ok(core_crypto::ecdsa::Secp256k1KeyPair::generate())
            }
        }
    }

    pub fn load_or_generate_vrf(&self) -> anyhow::Result<core_crypto::vrf::VrfKeyPair> {
        let seed = self.vrf_seed_bytes()?;
        core_crypto::vrf::VrfKeyPair::from_bytes(&seed)
            .map_err(|err| anyhow::anyhow!("invalid keystore vrf secret: {err}"))
    }

    /// The raw 64-byte VRF seed, decoded from `vrf_secret_hex` or generated
    /// once and handed back as bytes rather than as a `VrfKeyPair` —
    /// `VrfKeyPair` has no `to_bytes()`, so a caller needing the same VRF
    /// identity in more than one owned keypair (the PBFT manager and the
    /// DAG proposer both sign with it) must re-derive each instance from
    /// this seed rather than generating twice.
    pub fn vrf_seed_bytes(&self) -> anyhow::Result<[u8; 64]> {
        match &self.vrf_secret_hex {
            Some(hex) => decode_fixed_hex(hex),
            None => {
                tracing::warn!("no keystore.vrf_secret_hex configured, generating an ephemeral vrf key");
                let mut seed = [0u8; 64];
                rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut seed);
                Ok(seed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        EngineConfig::default().validate().unwrap();
    }

    #[test]
    fn zero_chain_id_is_rejected() {
        let mut config = EngineConfig::default();
        config.chain_id = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn roundtrips_through_toml() {
        let config = EngineConfig::default();
        let serialized = toml::to_string(&config).unwrap();
        let reloaded: EngineConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(reloaded.chain_id, config.chain_id);
    }

    #[test]
    fn malformed_genesis_address_is_rejected() {
        let mut config = EngineConfig::default();
        config.dpos.genesis_validators.push(GenesisValidator {
            address: "not-hex".to_string(),
            balance: 1,
            vrf_public_key: "0x".to_string() + &"ab".repeat(32),
        });
        assert!(config.validate().is_err());
    }
}
