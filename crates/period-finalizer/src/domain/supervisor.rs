//! Halt-on-fatal-error bookkeeping. `pbft_engine::FinalizationGateway`'s
//! `finalize_period` returns `()`, not a `Result` — the driver that calls
//! it unconditionally advances its own round state once the call
//! resolves, with no channel for this crate to report a consensus-level
//! failure back through. Mirrors `shared-types`' `NodeState` tri-state:
//! a terminal error here means the node must stop advancing rather than
//! guess, so the finalizer flips to `HaltedAwaitingIntervention` and never
//! resolves that call, which keeps the driver from ever reaching its
//! post-call `finalize_period()` advance for this anchor.

use parking_lot::RwLock;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SupervisorState {
    Running,
    Syncing,
    HaltedAwaitingIntervention,
}

pub struct Supervisor {
    state: RwLock<SupervisorState>,
    halt_reason: RwLock<Option<String>>,
}

impl Supervisor {
    pub fn new() -> Self {
        Self { state: RwLock::new(SupervisorState::Running), halt_reason: RwLock::new(None) }
    }

    pub fn state(&self) -> SupervisorState {
        *self.state.read()
    }

    pub fn is_halted(&self) -> bool {
        self.state() == SupervisorState::HaltedAwaitingIntervention
    }

    pub fn halt_reason(&self) -> Option<String> {
        self.halt_reason.read().clone()
    }

    /// Flip to halted with `reason` recorded for the supervisor task (in
    /// `core-node`) to log. Idempotent: a second halt only keeps the
    /// first reason.
    pub fn halt(&self, reason: String) {
        let mut state = self.state.write();
        if *state != SupervisorState::HaltedAwaitingIntervention {
            *state = SupervisorState::HaltedAwaitingIntervention;
            *self.halt_reason.write() = Some(reason);
        }
    }

    pub fn set_syncing(&self, syncing: bool) {
        let mut state = self.state.write();
        if *state == SupervisorState::Running && syncing {
            *state = SupervisorState::Syncing;
        } else if *state == SupervisorState::Syncing && !syncing {
            *state = SupervisorState::Running;
        }
    }

    /// Block forever once halted, holding the caller (the PBFT driver's
    /// await on `finalize_period`) suspended rather than letting it
    /// observe completion and advance past a period this node refused to
    /// finalize.
    pub async fn suspend_forever(&self) {
        std::future::pending::<()>().await
    }
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new()
    }
}
