//! The outbound events the core emits for the peer layer to carry onto the
//! wire, plus the finalization notification that downstream subscribers
//! (e.g. JSON/GraphQL APIs, out of scope here) observe.

use core_types::{ChainHead, DagBlock, PbftBlock, PeriodData, Vote, VoteBundle};

/// Every outbound/notification event this core ever emits. One flat enum
/// rather than a family of versioned packet structs — `VotePacket` and
/// `VotesBundlePacket` and their versioned variants collapse into one
/// wire type, and the event bus carries the same unification one level up.
#[derive(Clone, Debug)]
pub enum CoreEvent {
    /// `broadcast_dag_block`
    DagBlockReady(DagBlock),
    /// `broadcast_vote`
    VoteReady(Vote),
    /// `broadcast_votes_bundle`
    VotesBundleReady { topic: VoteBundleTopic, bundle: VoteBundle },
    /// `broadcast_pbft_block`
    PbftBlockReady(PbftBlock),
    /// `request_dag_sync`
    DagSyncRequested { peer_period_hint: u64 },
    /// `request_period_data`
    PeriodDataRequested { periods: Vec<u64> },
    /// A period has been finalized and committed.
    PeriodFinalized { period_data: Box<PeriodData>, head: ChainHead },
    /// A double vote (the same voter signing two different block hashes
    /// for one `(period, round, step)` slot) was observed.
    Equivocation { period: u64, round: u64, step: u64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoteBundleTopic {
    NextVotes,
    RewardVotes,
}

/// Coarse topic used for subscription filtering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventTopic {
    Dag,
    Votes,
    Pbft,
    Sync,
    Finalization,
}

impl CoreEvent {
    pub fn topic(&self) -> EventTopic {
        match self {
            CoreEvent::DagBlockReady(_) => EventTopic::Dag,
            CoreEvent::VoteReady(_) | CoreEvent::VotesBundleReady { .. } => EventTopic::Votes,
            CoreEvent::PbftBlockReady(_) => EventTopic::Pbft,
            CoreEvent::DagSyncRequested { .. } | CoreEvent::PeriodDataRequested { .. } => {
                EventTopic::Sync
            }
            CoreEvent::PeriodFinalized { .. } | CoreEvent::Equivocation { .. } => {
                EventTopic::Finalization
            }
        }
    }
}

/// A subscription filter over one or more topics; `None` (via
/// [`EventFilter::all`]) matches everything.
#[derive(Clone, Debug, Default)]
pub struct EventFilter {
    topics: Option<Vec<EventTopic>>,
}

impl EventFilter {
    pub fn all() -> Self {
        Self { topics: None }
    }

    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self { topics: Some(topics) }
    }

    pub fn matches(&self, event: &CoreEvent) -> bool {
        match &self.topics {
            None => true,
            Some(topics) => topics.contains(&event.topic()),
        }
    }
}
