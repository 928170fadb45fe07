//! `GenesisDpos`: the fixed validator set `DposConfig` pins in place of
//! the real DPoS state-transition collaborator. Every weight and VRF key
//! is frozen at genesis for the lifetime of the node — documented as a
//! deliberate placeholder in `DESIGN.md`, not a model of real stake
//! movement.

use std::collections::HashMap;

use core_crypto::vrf::VrfPublicKey;
use core_types::{Address, Period};

use crate::config::DposConfig;

struct Entry {
    weight: u64,
    vrf_public_key: VrfPublicKey,
}

pub struct GenesisDpos {
    validators: HashMap<Address, Entry>,
    total_weight: u64,
}

impl GenesisDpos {
    pub fn from_config(config: &DposConfig) -> anyhow::Result<Self> {
        let mut validators = HashMap::new();
        let mut total_weight = 0u64;
        for genesis in &config.genesis_validators {
            let address = genesis.address_bytes()?;
            let vrf_public_key = genesis.vrf_public_key_decoded()?;
            let weight = if genesis.balance >= config.eligibility_balance_threshold {
                genesis.balance / config.vote_eligibility_balance_step
            } else {
                0
            };
            total_weight += weight;
            validators.insert(address, Entry { weight, vrf_public_key });
        }
        Ok(Self { validators, total_weight })
    }

    fn weight_of(&self, address: &Address) -> u64 {
        self.validators.get(address).map(|e| e.weight).unwrap_or(0)
    }
}

impl dag_engine::DposGateway for GenesisDpos {
    fn dpos_is_eligible(&self, address: &Address, _period: Period) -> bool {
        self.weight_of(address) > 0
    }
}

impl pbft_engine::DposGateway for GenesisDpos {
    fn vote_weight(&self, voter: &Address, _period: Period) -> u64 {
        self.weight_of(voter)
    }

    fn total_eligible_votes(&self, _period: Period) -> u64 {
        self.total_weight
    }
}

impl vote_manager::DposGateway for GenesisDpos {
    fn vote_weight(&self, voter: &Address, _period: Period) -> u64 {
        self.weight_of(voter)
    }

    fn total_eligible_votes(&self, _period: Period) -> u64 {
        self.total_weight
    }
}

impl vote_manager::ValidatorKeyGateway for GenesisDpos {
    fn vrf_public_key(&self, voter: &Address, _period: Period) -> Option<VrfPublicKey> {
        self.validators.get(voter).map(|e| e.vrf_public_key)
    }
}
