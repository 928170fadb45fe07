use core_crypto::vrf::VrfPublicKey;
use core_types::{Address, Period};

/// The slice of `StateAPI`/DPoS accounting vote verification needs:
/// a voter's weight (to fill in `Vote::weight` once verified) and the
/// period total (for `2t+1`).
pub trait DposGateway: Send + Sync {
    fn vote_weight(&self, voter: &Address, period: Period) -> u64;
    fn total_eligible_votes(&self, period: Period) -> u64;
}

/// The validator registry's VRF public key lookup — votes don't carry
/// their signer's VRF key inline (unlike `DagBlock`), so verification
/// needs this out-of-band.
pub trait ValidatorKeyGateway: Send + Sync {
    fn vrf_public_key(&self, voter: &Address, period: Period) -> Option<VrfPublicKey>;
}
