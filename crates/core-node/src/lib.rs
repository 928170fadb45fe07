//! # core-node
//!
//! The `Engine` composition root: loads [`config::EngineConfig`], wires
//! every consensus subsystem crate directly (no IPC, no cyclic smart
//! pointers — spec.md §9's redesign mandate), and drives them with a
//! handful of long-running tasks. `main.rs` is the thinnest possible
//! shell around [`engine::Engine`].

pub mod adapters;
pub mod config;
pub mod engine;

pub use config::EngineConfig;
pub use engine::Engine;
