pub mod inbound;
pub mod outbound;

pub use inbound::VoteInbound;
pub use outbound::{DposGateway, ValidatorKeyGateway};
