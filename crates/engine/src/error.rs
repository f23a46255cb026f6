// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy for the engine crate (spec.md §7).

use thiserror::Error;

/// Orchestrator startup failure (spec.md §4.10 step 2, §7 "fatal; `start()`
/// returns an error and the daemon exits").
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrchestratorError {
    #[error("no provider passed validate_config() and health_check()")]
    AllProvidersFailed,
}
