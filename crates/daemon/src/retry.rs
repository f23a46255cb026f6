// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Retry + circuit-breaker policy, per provider (spec.md §4.12, §3 `CircuitState`).

use moverd_core::Clock;
use parking_lot::Mutex;
use rand::Rng;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Per-provider retry parameters (spec.md §4.12).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_factor: f64,
    pub max_backoff: Duration,
    pub jitter: bool,
    pub timeout_per_attempt: Duration,
    pub failure_threshold: u32,
    pub recovery_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_factor: 2.0,
            max_backoff: Duration::from_secs(30),
            jitter: true,
            timeout_per_attempt: Duration::from_secs(10),
            failure_threshold: 5,
            recovery_timeout: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Delay before attempt `k` (1-indexed), before any rate-limit hint is
    /// applied (spec.md §4.12).
    pub fn backoff_for_attempt(&self, k: u32) -> Duration {
        let exp = self.backoff_factor.powi((k.saturating_sub(1)) as i32);
        let capped = exp.min(self.max_backoff.as_secs_f64());
        let factor = if self.jitter { rand::thread_rng().gen_range(0.5..=1.5) } else { 1.0 };
        Duration::from_secs_f64((capped * factor).max(0.0))
    }
}

/// The three circuit-breaker states (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug, Clone)]
struct ProviderCircuit {
    state: CircuitState,
    consecutive_failures: u32,
    last_failure_at: Option<Instant>,
}

impl ProviderCircuit {
    fn new() -> Self {
        Self { state: CircuitState::Closed, consecutive_failures: 0, last_failure_at: None }
    }
}

/// What a call should do about the circuit before attempting delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitDecision {
    Proceed,
    Reject,
}

/// Guarded per-provider circuit-breaker table (spec.md §5 "guarded; each
/// update ... is an atomic read-modify-write").
pub struct CircuitBreaker<C: Clock> {
    clock: C,
    failure_threshold: u32,
    recovery_timeout: Duration,
    circuits: Mutex<HashMap<String, ProviderCircuit>>,
}

impl<C: Clock> CircuitBreaker<C> {
    pub fn new(clock: C, failure_threshold: u32, recovery_timeout: Duration) -> Self {
        Self { clock, failure_threshold, recovery_timeout, circuits: Mutex::new(HashMap::new()) }
    }

    /// Single-trial half-open semantics: `guard` both reads and, when the
    /// circuit has just transitioned from `open` to `half_open`, commits
    /// that transition atomically so two concurrent callers can't both
    /// treat the probe call as "the" trial.
    pub fn guard(&self, provider: &str) -> CircuitDecision {
        let mut circuits = self.circuits.lock();
        let circuit = circuits.entry(provider.to_string()).or_insert_with(ProviderCircuit::new);

        if circuit.state == CircuitState::Open {
            let elapsed_since_failure =
                circuit.last_failure_at.map(|at| self.clock.now().saturating_duration_since(at));
            if elapsed_since_failure.is_some_and(|elapsed| elapsed > self.recovery_timeout) {
                circuit.state = CircuitState::HalfOpen;
            } else {
                return CircuitDecision::Reject;
            }
        }
        CircuitDecision::Proceed
    }

    pub fn record_success(&self, provider: &str) {
        let mut circuits = self.circuits.lock();
        let circuit = circuits.entry(provider.to_string()).or_insert_with(ProviderCircuit::new);
        circuit.state = CircuitState::Closed;
        circuit.consecutive_failures = 0;
        circuit.last_failure_at = None;
    }

    pub fn record_failure(&self, provider: &str) {
        let mut circuits = self.circuits.lock();
        let circuit = circuits.entry(provider.to_string()).or_insert_with(ProviderCircuit::new);
        circuit.consecutive_failures += 1;
        circuit.last_failure_at = Some(self.clock.now());
        if circuit.state == CircuitState::HalfOpen || circuit.consecutive_failures >= self.failure_threshold {
            circuit.state = CircuitState::Open;
        }
    }

    pub fn state(&self, provider: &str) -> CircuitState {
        self.circuits.lock().get(provider).map(|c| c.state).unwrap_or(CircuitState::Closed)
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
