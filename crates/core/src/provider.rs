// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Provider contract for outbound notification delivery (spec.md §6.4).
//!
//! Providers are values of this trait, not a class hierarchy (spec.md §9
//! "abstract base classes for plugins"). The core holds them as
//! `Arc<dyn Provider>` and never inspects their concrete type.

use crate::model::NotificationData;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Outcome of `health_check()` (spec.md §6.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unreachable,
}

/// Classified failure from a provider call (spec.md §9: "model errors as a
/// tagged variant ... not as exception subclasses").
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProviderError {
    #[error("transient failure: {0}")]
    Transient(String),

    #[error("permanent failure: {0}")]
    Permanent(String),

    #[error("rate limited{}", retry_after.map(|d| format!(", retry after {d:?}")).unwrap_or_default())]
    RateLimited { retry_after: Option<Duration> },

    /// The call was skipped because the provider's circuit is open
    /// (spec.md §7 "circuit-open ... does NOT count toward
    /// consecutive-failure escalation").
    #[error("circuit open")]
    CircuitOpen,
}

impl ProviderError {
    /// Non-retryable errors short-circuit the retry loop immediately
    /// (spec.md §4.12).
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ProviderError::Permanent(_) | ProviderError::CircuitOpen)
    }

    /// A caller-imposed retry-after hint, when the provider supplied one
    /// (spec.md §4.12 "honour that hint in place of the computed delay").
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            ProviderError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

/// One outcome of `send_notification` (spec.md §3 `ProviderResult`, §6.4).
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderResult {
    pub provider_identifier: String,
    pub success: bool,
    pub error_message: Option<String>,
    pub delivery_time_ms: u64,
}

/// Outbound notification sink (spec.md §6.4).
#[async_trait]
pub trait Provider: Send + Sync {
    /// Stable identifier this provider is addressed by. The core never
    /// inspects wire format or credentials beyond this string.
    fn identifier(&self) -> &str;

    async fn send_notification(&self, data: &NotificationData) -> Result<ProviderResult, ProviderError>;

    /// Synchronous, no I/O (spec.md §6.4).
    fn validate_config(&self) -> bool;

    /// May perform a lightweight round-trip; must respect `timeout`.
    async fn health_check(&self, timeout: Duration) -> HealthStatus;
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
