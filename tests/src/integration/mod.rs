//! Cross-crate scenarios that exercise more than one engine crate wired
//! together, rather than one crate's domain logic in isolation.

pub mod double_vote;
pub mod end_to_end;
pub mod replay_protection;
