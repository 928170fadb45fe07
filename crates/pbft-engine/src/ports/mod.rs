pub mod inbound;
pub mod outbound;

pub use inbound::PbftInbound;
pub use outbound::{ChainGateway, DagCandidateGateway, DposGateway, FinalizationGateway, VoteQuorumGateway};
