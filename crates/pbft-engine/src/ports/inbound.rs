//! Driving ports: how the (out-of-scope) peer layer and other core
//! components call into the PBFT driver. Vote/votes-bundle ingress is
//! `vote-manager`'s inbound surface, not this crate's — the driver learns
//! about newly-verified votes via `CoreEvent::VoteReady`/`VotesBundleReady`
//! on the event bus instead.

use core_types::PbftBlock;

use crate::error::PbftResult;

pub trait PbftInbound: Send + Sync {
    /// A peer-supplied PBFT block, received standalone (e.g. ahead of its
    /// quorum's votes arriving) or as part of sync catch-up fast-forward.
    fn on_pbft_block(&self, block: PbftBlock, peer: &str) -> PbftResult<()>;

    /// Force the round clock to re-check its wake conditions immediately,
    /// bypassing the timer — used by `core-node` wiring and tests.
    fn wake_up(&self);
}
