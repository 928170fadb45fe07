//! # core-bus
//!
//! In-process event bus for the outbound broadcast/request callbacks named
//! the peer layer subscribes to, and the finalizer's "Notify" step. Every
//! engine crate depends on this instead of calling each other directly —
//! subscription IDs into an event bus.

pub mod bus;
pub mod events;

pub use bus::{EventBus, Subscription, DEFAULT_CHANNEL_CAPACITY};
pub use events::{CoreEvent, EventFilter, EventTopic, VoteBundleTopic};
