// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! moverd-engine: the I/O-touching half of the monitoring daemon -- the PID
//! file watcher, process validator, and the orchestrator that wires them
//! together with the progress engine and the dispatcher (spec.md §4.1-§4.2,
//! §4.10).

pub mod error;
pub mod orchestrator;
pub mod pidwatch;
pub mod procvalidate;

pub use error::OrchestratorError;
pub use orchestrator::{Orchestrator, OrchestratorConfig, HEALTH_CHECK_TIMEOUT};
pub use pidwatch::PidFileWatcher;
pub use procvalidate::ProcessValidator;
