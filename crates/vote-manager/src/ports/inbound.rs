//! Driving ports: how the (out-of-scope) peer layer hands this crate
//! gossiped votes and votes-bundles.

use core_bus::VoteBundleTopic;
use core_types::{Vote, VoteBundle};

use crate::error::VoteResult;

pub trait VoteInbound: Send + Sync {
    fn on_vote(&self, vote: Vote, peer: &str) -> VoteResult<()>;
    fn on_votes_bundle(&self, topic: VoteBundleTopic, bundle: VoteBundle, peer: &str) -> VoteResult<()>;
}
