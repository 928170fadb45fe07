pub mod inbound;
pub mod outbound;

pub use inbound::PeriodFinalizerInbound;
pub use outbound::{PeriodHeader, StateApiGateway, StateTransitionOutcome, TransactionPoolGateway};
