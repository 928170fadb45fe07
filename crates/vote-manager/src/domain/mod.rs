pub mod index;
pub mod manager;

pub use index::VerifiedIndex;
pub use manager::VoteManager;
