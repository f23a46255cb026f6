// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy for the core crate (spec.md §7).

use thiserror::Error;

/// Errors raised by the lifecycle state machine (spec.md §4.3).
///
/// A programmer error in steady-state operation: surfaced and logged with
/// full state, never silently swallowed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid lifecycle transition: {from} -> {to}")]
pub struct InvalidTransition {
    pub from: &'static str,
    pub to: &'static str,
}

/// Errors raised by the progress engine (spec.md §4.4).
///
/// spec.md §4.4 also lists "negative bytes" as a rejected input; this
/// crate represents byte counts as `u64` (spec.md §3 already states
/// `bytes_used: non-negative int`), so that case is excluded by the type
/// system rather than checked at runtime.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidInput {
    #[error("window_size must be at least 1")]
    ZeroWindow,
    #[error("exponential smoothing alpha must be within [0, 1], got {0}")]
    AlphaOutOfRange(String),
}
