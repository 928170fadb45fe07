//! In-memory event bus: every engine crate publishes [`CoreEvent`]s here and
//! `core-node`'s peer-layer adapter is the (sole, in this repo) subscriber
//! that turns them into outbound network packets.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::events::{CoreEvent, EventFilter};

pub const DEFAULT_CHANNEL_CAPACITY: usize = 4096;

pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
    events_published: AtomicU64,
    capacity: usize,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender, events_published: AtomicU64::new(0), capacity }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publish an event; returns the number of subscribers that received
    /// it (`0` if there were none — this is not an error, callbacks are
    /// fire-and-forget).
    pub fn publish(&self, event: CoreEvent) -> usize {
        self.events_published.fetch_add(1, Ordering::Relaxed);
        match self.sender.send(event) {
            Ok(count) => {
                debug!(receivers = count, "core event published");
                count
            }
            Err(_) => {
                warn!("core event dropped, no subscribers");
                0
            }
        }
    }

    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        Subscription { receiver: self.sender.subscribe(), filter }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// A filtered receive handle. `recv` skips events the filter rejects rather
/// than surfacing them, so callers never see a topic they didn't ask for.
pub struct Subscription {
    receiver: broadcast::Receiver<CoreEvent>,
    filter: EventFilter,
}

impl Subscription {
    pub async fn recv(&mut self) -> Option<CoreEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => {
                    if self.filter.matches(&event) {
                        return Some(event);
                    }
                }
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "subscriber lagged, events dropped");
                }
            }
        }
    }
}
