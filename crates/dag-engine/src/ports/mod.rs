pub mod inbound;
pub mod outbound;

pub use inbound::DagInbound;
pub use outbound::{DposGateway, FinalizedDagGateway, MempoolGateway};
