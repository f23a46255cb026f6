// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle state machine for the mover's observed run cycle (spec.md §4.3).
//!
//! The state machine itself only reacts to already-classified inputs (a PID
//! file event kind, a liveness check result, an external "baseline
//! captured" signal). Reading the PID file and polling the process table
//! are the engine crate's job (spec.md §4.1, §4.2); this module is pure
//! and fully testable without any I/O.

use crate::model::PidFileEventKind;
use crate::InvalidTransition;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// The four states of one mover cycle (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoverState {
    Waiting,
    Started,
    Monitoring,
    Completed,
}

crate::simple_display! {
    MoverState {
        Waiting => "waiting",
        Started => "started",
        Monitoring => "monitoring",
        Completed => "completed",
    }
}

/// Emitted on every validated transition (spec.md §3).
///
/// Invariant: `previous_state != new_state`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoverLifecycleEvent {
    pub previous_state: MoverState,
    pub new_state: MoverState,
    pub pid: Option<i32>,
    pub timestamp: Instant,
    pub message: String,
}

/// Owns the current state and the PID slot for one daemon instance
/// (spec.md §4.3). Not `Clone`/`Send`-shared: the orchestrator owns it
/// exclusively (spec.md §3 Ownership).
#[derive(Debug)]
pub struct LifecycleStateMachine {
    state: MoverState,
    pid: Option<i32>,
}

impl Default for LifecycleStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl LifecycleStateMachine {
    pub fn new() -> Self {
        Self { state: MoverState::Waiting, pid: None }
    }

    pub fn state(&self) -> MoverState {
        self.state
    }

    pub fn pid(&self) -> Option<i32> {
        self.pid
    }

    fn transition(
        &mut self,
        new_state: MoverState,
        pid: Option<i32>,
        message: impl Into<String>,
        now: Instant,
    ) -> MoverLifecycleEvent {
        let previous_state = self.state;
        debug_assert_ne!(previous_state, new_state, "no-op transition requested");
        self.state = new_state;
        self.pid = pid;
        MoverLifecycleEvent {
            previous_state,
            new_state,
            pid: self.pid,
            timestamp: now,
            message: message.into(),
        }
    }

    /// Apply a classified PID-file event (spec.md §4.1 event kinds).
    ///
    /// `pid_running` must already reflect a process-table lookup for
    /// `pid` (spec.md §4.2); this method performs no I/O. Returns `None`
    /// when the event doesn't correspond to a transition for the current
    /// state — that is a normal, silent no-op (e.g. a `modified` event
    /// while `WAITING`), not an error.
    pub fn apply_pid_event(
        &mut self,
        kind: PidFileEventKind,
        pid: Option<i32>,
        pid_running: bool,
        now: Instant,
    ) -> Option<MoverLifecycleEvent> {
        use MoverState::*;
        use PidFileEventKind::*;

        match (self.state, kind, pid) {
            (Waiting, Created, Some(p)) | (Completed, Created, Some(p)) if pid_running => {
                Some(self.transition(Started, pid, format!("pid file created (pid={p})"), now))
            }
            (Started, Deleted, _) => {
                let pid = self.pid;
                Some(self.transition(Completed, pid, "pid file deleted", now))
            }
            (Monitoring, Deleted, _) => {
                let pid = self.pid;
                Some(self.transition(Completed, pid, "pid file deleted", now))
            }
            (Monitoring, Modified, _) => {
                let pid = self.pid;
                Some(self.transition(Completed, pid, "pid file modified mid-cycle", now))
            }
            _ => None,
        }
    }

    /// Apply an out-of-band liveness check (spec.md §4.2): the PID file
    /// may be untouched while the process it names has already exited.
    /// Only meaningful in `STARTED`/`MONITORING`.
    pub fn apply_liveness_check(&mut self, pid_running: bool, now: Instant) -> Option<MoverLifecycleEvent> {
        use MoverState::*;
        if pid_running {
            return None;
        }
        match self.state {
            Started | Monitoring => {
                let pid = self.pid;
                Some(self.transition(Completed, pid, "process no longer running", now))
            }
            _ => None,
        }
    }

    /// Record that the orchestrator has captured a baseline sample
    /// (spec.md §4.10 step 1 of STARTED handling). Only valid from
    /// `STARTED`; any other source state is a programmer error.
    pub fn capture_baseline(&mut self, now: Instant) -> Result<MoverLifecycleEvent, InvalidTransition> {
        if self.state != MoverState::Started {
            return Err(InvalidTransition { from: self.state.into(), to: "MONITORING" });
        }
        let pid = self.pid;
        Ok(self.transition(MoverState::Monitoring, pid, "baseline captured", now))
    }

    /// Automatic `COMPLETED -> WAITING` transition, run immediately after
    /// the orchestrator has dispatched the completion notification.
    /// Idempotent: calling this when not `COMPLETED` is a no-op.
    pub fn advance_to_waiting(&mut self, now: Instant) -> Option<MoverLifecycleEvent> {
        if self.state != MoverState::Completed {
            return None;
        }
        Some(self.transition(MoverState::Waiting, None, "cycle reset", now))
    }
}

impl From<MoverState> for &'static str {
    fn from(state: MoverState) -> Self {
        match state {
            MoverState::Waiting => "WAITING",
            MoverState::Started => "STARTED",
            MoverState::Monitoring => "MONITORING",
            MoverState::Completed => "COMPLETED",
        }
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
