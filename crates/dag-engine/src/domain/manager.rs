//! The stateful DAG admission/frontier manager: composes [`NonFinalSet`],
//! [`ProposalPeriodMap`] and [`select_frontier`] with the VDF/VRF/DPoS
//! collaborators into the single entry point `core-node` drives.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use core_crypto::ecdsa::RecoverableSignature;
use core_crypto::vdf;
use core_crypto::vrf::{output_to_threshold, VrfProof, VrfPublicKey};
use core_types::{DagBlock, Hash, Level, Period, SortitionParams, VdfClass, NULL_HASH};

use crate::error::{DagError, DagResult};
use crate::ports::outbound::{DposGateway, FinalizedDagGateway, MempoolGateway};

use super::admission::DagBlockRecord;
use super::frontier::{select_frontier, Frontier};
use super::level_index::NonFinalSet;
use super::proposal_period::ProposalPeriodMap;

/// Every way `DagManager::admit` can resolve a block, mirroring
/// `spec.md`'s `AdmissionOutcome` set. Transient outcomes leave the block
/// retryable; terminal ones blacklist its hash.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdmissionOutcome {
    Inserted,
    AlreadyKnown,
    MissingParent,
    MissingTx,
    VdfInvalid,
    NotEligible,
    GasOverLimit,
    MismatchedEstimations,
    TooOld,
    FuturePeriod,
}

impl AdmissionOutcome {
    pub fn is_inserted(self) -> bool {
        matches!(self, AdmissionOutcome::Inserted)
    }
}

/// The sortition parameters and VRF salt active for a proposal period. The
/// salt is the hash of the period's anchor `PbftBlock` — `core-node` sets
/// it via [`DagManager::set_period_context`] as each period finalizes.
#[derive(Clone, Copy, Debug)]
pub struct PeriodContext {
    pub params: SortitionParams,
    pub salt: Hash,
}

pub struct DagManager {
    non_final: RwLock<NonFinalSet>,
    proposal_periods: RwLock<ProposalPeriodMap>,
    period_contexts: RwLock<HashMap<Period, PeriodContext>>,
    gas_limit: u64,
    ghost_path_move_back: u32,
    dpos: Arc<dyn DposGateway>,
    mempool: Arc<dyn MempoolGateway>,
    finalized: Arc<dyn FinalizedDagGateway>,
}

impl DagManager {
    pub fn new(
        max_levels_per_period: Level,
        gas_limit: u64,
        ghost_path_move_back: u32,
        genesis_context: PeriodContext,
        dpos: Arc<dyn DposGateway>,
        mempool: Arc<dyn MempoolGateway>,
        finalized: Arc<dyn FinalizedDagGateway>,
    ) -> Self {
        let mut contexts = HashMap::new();
        contexts.insert(1, genesis_context);
        Self {
            non_final: RwLock::new(NonFinalSet::new()),
            proposal_periods: RwLock::new(ProposalPeriodMap::genesis(max_levels_per_period)),
            period_contexts: RwLock::new(contexts),
            gas_limit,
            ghost_path_move_back,
            dpos,
            mempool,
            finalized,
        }
    }

    /// Called once a period finalizes, to grow the level→period map and
    /// register the sortition parameters/salt the next period(s) use.
    pub fn set_period_context(&self, finalized_period: Period, max_level: Level, next_context: PeriodContext) {
        let mut periods = self.proposal_periods.write();
        let before = periods.top_period();
        periods.on_period_finalized(finalized_period, max_level);
        let after = periods.top_period();
        drop(periods);
        if after > before {
            self.period_contexts.write().insert(after, next_context);
        }
    }

    pub fn frontier(&self, anchor: Hash) -> Frontier {
        select_frontier(&self.non_final.read(), anchor, self.ghost_path_move_back)
    }

    pub fn proposal_period_for_level(&self, level: Level) -> Option<Period> {
        self.proposal_periods.read().proposal_period_for_level(level)
    }

    pub fn period_context(&self, period: Period) -> Option<PeriodContext> {
        self.period_contexts.read().get(&period).copied()
    }

    pub fn max_level(&self) -> Level {
        self.non_final.read().max_level()
    }

    pub fn remove_finalized(&self, hashes: &[Hash]) -> Vec<DagBlockRecord> {
        self.non_final.write().remove_finalized(hashes)
    }

    /// Every non-final block not already in `known`, for answering a
    /// peer's DAG sync request. The non-final set never holds finalized
    /// blocks, so this alone is the full "missing blocks" answer for any
    /// peer already caught up through the last finalized period.
    pub fn blocks_excluding(&self, known: &[Hash]) -> Vec<DagBlock> {
        let set = self.non_final.read();
        set.iter().filter(|record| !known.contains(&record.hash())).map(|record| record.block.clone()).collect()
    }

    /// Fetch a non-final block by hash, for the period finalizer's sub-DAG
    /// BFS collection. Finalized blocks are no longer held here; the
    /// caller only ever asks for blocks under an anchor that hasn't
    /// finalized yet.
    pub fn get_block(&self, hash: &Hash) -> Option<DagBlock> {
        self.non_final.read().get(hash).map(|record| record.block.clone())
    }

    pub fn is_known(&self, hash: &Hash) -> bool {
        self.non_final.read().is_known(hash) || self.finalized.is_finalized(hash)
    }

    pub fn level_of(&self, hash: &Hash) -> Option<Level> {
        if *hash == NULL_HASH {
            return Some(0);
        }
        if let Some(record) = self.non_final.read().get(hash) {
            return Some(record.level());
        }
        self.finalized.level_of(hash)
    }

    /// Admit a gossiped or locally-proposed DAG block. Marks the hash seen
    /// before validation runs so concurrent deliveries of the same block
    /// collapse to one verification pass; terminal failures blacklist the
    /// hash so repeated gossip of the same bad block is rejected in O(1)
    /// without re-verification.
    pub fn admit(&self, block: DagBlock) -> AdmissionOutcome {
        let hash = block.hash();

        {
            let set = self.non_final.read();
            if set.is_known(&hash) || self.finalized.is_finalized(&hash) {
                return AdmissionOutcome::AlreadyKnown;
            }
        }
        {
            let mut set = self.non_final.write();
            if set.is_known(&hash) || !set.mark_seen(hash) {
                return AdmissionOutcome::AlreadyKnown;
            }
        }

        match self.validate(&block, hash) {
            Ok(()) => {
                self.non_final.write().insert(DagBlockRecord::new_non_final(block));
                debug!(hash = ?hash, "dag block admitted");
                AdmissionOutcome::Inserted
            }
            Err(err) => {
                if err.is_terminal() {
                    self.non_final.write().mark_invalid(hash);
                    warn!(hash = ?hash, error = %err, "dag block rejected");
                } else {
                    // Transient: the block isn't blacklisted, so unmark it
                    // `seen` too, or a re-gossiped copy would short-circuit
                    // to `AlreadyKnown` once its dependency resolves and
                    // never get re-validated.
                    self.non_final.write().unmark_seen(&hash);
                    debug!(hash = ?hash, error = %err, "dag block admission deferred");
                }
                Self::outcome_for_error(&err)
            }
        }
    }

    fn outcome_for_error(err: &DagError) -> AdmissionOutcome {
        match err {
            DagError::AlreadyKnown(_) => AdmissionOutcome::AlreadyKnown,
            DagError::MissingParent(_) => AdmissionOutcome::MissingParent,
            DagError::MissingTx(_) => AdmissionOutcome::MissingTx,
            DagError::VdfInvalid(_) | DagError::InvalidSignature(_) => AdmissionOutcome::VdfInvalid,
            DagError::Types(core_types::TypesError::MismatchedEstimations { .. }) => {
                AdmissionOutcome::MismatchedEstimations
            }
            DagError::Types(_) => AdmissionOutcome::VdfInvalid,
            DagError::NotEligible(_) => AdmissionOutcome::NotEligible,
            DagError::GasOverLimit(_) => AdmissionOutcome::GasOverLimit,
            DagError::MismatchedEstimations(_) => AdmissionOutcome::MismatchedEstimations,
            DagError::TooOld(_) => AdmissionOutcome::TooOld,
            DagError::FuturePeriod(_) => AdmissionOutcome::FuturePeriod,
            DagError::InvalidStructure { .. } => AdmissionOutcome::VdfInvalid,
        }
    }

    fn validate(&self, block: &DagBlock, hash: Hash) -> DagResult<()> {
        block.check_structure()?;

        if block.total_gas_estimation() > self.gas_limit {
            return Err(DagError::GasOverLimit(hash));
        }

        let pivot_level = self.level_of(&block.pivot).ok_or(DagError::MissingParent(hash))?;
        let mut max_parent_level = pivot_level;
        for tip in &block.tips {
            let tip_level = self.level_of(tip).ok_or(DagError::MissingParent(hash))?;
            max_parent_level = max_parent_level.max(tip_level);
        }
        if block.level != max_parent_level + 1 {
            return Err(DagError::InvalidStructure {
                hash,
                reason: format!("level {} != 1 + max-parent-level {}", block.level, max_parent_level),
            });
        }

        for tx in &block.transactions {
            if !self.mempool.is_known(tx) {
                return Err(DagError::MissingTx(hash));
            }
        }

        let period = self
            .proposal_periods
            .read()
            .proposal_period_for_level(block.level)
            .ok_or(DagError::FuturePeriod(hash))?;
        let context = *self
            .period_contexts
            .read()
            .get(&period)
            .ok_or(DagError::FuturePeriod(hash))?;

        self.verify_sortition(block, hash, &context)?;

        let signing_hash = block.signing_hash();
        let sig = RecoverableSignature { r: block.r, s: block.s, v: block.v };
        let sender = sig
            .recover_address(&signing_hash, 0)
            .map_err(|_| DagError::InvalidSignature(hash))?;
        if !self.dpos.dpos_is_eligible(&sender, period) {
            return Err(DagError::NotEligible(hash));
        }

        Ok(())
    }

    fn verify_sortition(&self, block: &DagBlock, hash: Hash, context: &PeriodContext) -> DagResult<()> {
        let vdf_proof = block.vdf().map_err(DagError::Types)?;
        let (output, proof) =
            vdf_proof.vrf_output_and_proof().ok_or(DagError::VdfInvalid(hash))?;
        let vrf_public_key =
            VrfPublicKey::from_bytes(&vdf_proof.vrf_public_key).map_err(|_| DagError::VdfInvalid(hash))?;

        let message = sortition_message(block.level, &context.salt);
        let verified_output = vrf_public_key
            .verify(&message, &VrfProof { output, proof })
            .map_err(|_| DagError::VdfInvalid(hash))?;

        let threshold = output_to_threshold(&verified_output) as u32;
        let class = context.params.classify(threshold);
        if class.difficulty() != vdf_proof.difficulty {
            return Err(DagError::VdfInvalid(hash));
        }

        match class {
            VdfClass::Omit => {
                if !vdf_proof.is_omitted() {
                    return Err(DagError::VdfInvalid(hash));
                }
            }
            VdfClass::Stale { difficulty } | VdfClass::Normal { difficulty } => {
                let seed = vdf_seed(block.pivot, difficulty, context.params.vdf_lambda_bound);
                let solution = core_crypto::vdf::VdfOutput { y: vdf_proof.y.clone(), pi: vdf_proof.pi.clone() };
                if !vdf::verify(&seed, difficulty as u64, &solution) {
                    return Err(DagError::VdfInvalid(hash));
                }
            }
        }
        Ok(())
    }
}

impl crate::ports::inbound::DagInbound for DagManager {
    /// A gossiped DAG block: `admit` already dedupes and blacklists, so a
    /// terminal outcome here is reported to the caller for peer-demerit
    /// decisions rather than retried.
    fn on_dag_block(&self, block: DagBlock, peer: &str) -> DagResult<()> {
        match self.admit(block) {
            AdmissionOutcome::Inserted | AdmissionOutcome::AlreadyKnown => Ok(()),
            outcome @ (AdmissionOutcome::MissingParent
            | AdmissionOutcome::MissingTx
            | AdmissionOutcome::FuturePeriod) => {
                debug!(peer, ?outcome, "dag block deferred, dependency unresolved");
                Err(match outcome {
                    AdmissionOutcome::MissingParent => DagError::MissingParent(NULL_HASH),
                    AdmissionOutcome::MissingTx => DagError::MissingTx(NULL_HASH),
                    _ => DagError::FuturePeriod(NULL_HASH),
                })
            }
            outcome => {
                warn!(peer, ?outcome, "dag block rejected from peer");
                Err(match outcome {
                    AdmissionOutcome::VdfInvalid => DagError::VdfInvalid(NULL_HASH),
                    AdmissionOutcome::NotEligible => DagError::NotEligible(NULL_HASH),
                    AdmissionOutcome::GasOverLimit => DagError::GasOverLimit(NULL_HASH),
                    AdmissionOutcome::MismatchedEstimations => DagError::MismatchedEstimations(NULL_HASH),
                    AdmissionOutcome::TooOld => DagError::TooOld(NULL_HASH),
                    _ => DagError::TooOld(NULL_HASH),
                })
            }
        }
    }

    fn on_get_dag_sync(&self, _peer: &str, _peer_period_hint: u64, known_hashes: &[Hash]) -> Vec<DagBlock> {
        self.blocks_excluding(known_hashes)
    }
}

/// The message a proposer's VRF proves knowledge of: the candidate block's
/// level bound to the active period's salt, so the same keypair cannot
/// reuse a draw across periods or levels.
pub(crate) fn sortition_message(level: Level, salt: &Hash) -> Vec<u8> {
    let mut msg = Vec::with_capacity(8 + 32);
    msg.extend_from_slice(&level.to_be_bytes());
    msg.extend_from_slice(salt);
    msg
}

/// The VDF's input: the chosen pivot hash bound to the difficulty and
/// lambda bound it was computed under, so a solution cannot be replayed
/// across pivots or rescaled to a different difficulty.
pub fn vdf_seed(pivot: Hash, difficulty: u16, lambda_bound: u16) -> Vec<u8> {
    let mut seed = Vec::with_capacity(32 + 2 + 2);
    seed.extend_from_slice(&pivot);
    seed.extend_from_slice(&difficulty.to_be_bytes());
    seed.extend_from_slice(&lambda_bound.to_be_bytes());
    seed
}
