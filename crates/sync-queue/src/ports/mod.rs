pub mod inbound;

pub use inbound::SyncQueueInbound;
