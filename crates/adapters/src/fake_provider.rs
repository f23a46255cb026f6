// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake provider for other crates' tests (spec.md §6.4), in the same spirit
//! as the teacher's `FakeNotifyAdapter`: records every call it receives and
//! lets the test script its outcome.

use async_trait::async_trait;
use moverd_core::{HealthStatus, NotificationData, Provider, ProviderError, ProviderResult};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Scriptable `Provider` double. Defaults to passing `validate_config`,
/// reporting `Healthy`, and succeeding every `send_notification` call.
pub struct FakeProvider {
    identifier: String,
    calls: Mutex<Vec<NotificationData>>,
    validate_config: AtomicBool,
    health: Mutex<HealthStatus>,
    fail_with: Mutex<Option<ProviderError>>,
}

impl FakeProvider {
    pub fn new(identifier: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            identifier: identifier.into(),
            calls: Mutex::new(Vec::new()),
            validate_config: AtomicBool::new(true),
            health: Mutex::new(HealthStatus::Healthy),
            fail_with: Mutex::new(None),
        })
    }

    pub fn set_validate_config(&self, ok: bool) {
        self.validate_config.store(ok, Ordering::SeqCst);
    }

    pub fn set_health(&self, health: HealthStatus) {
        *self.health.lock() = health;
    }

    /// Every subsequent `send_notification` call fails with `err` until
    /// `succeed()` is called.
    pub fn fail_with(&self, err: ProviderError) {
        *self.fail_with.lock() = Some(err);
    }

    pub fn succeed(&self) {
        *self.fail_with.lock() = None;
    }

    pub fn calls(&self) -> Vec<NotificationData> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl Provider for FakeProvider {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    async fn send_notification(&self, data: &NotificationData) -> Result<ProviderResult, ProviderError> {
        self.calls.lock().push(data.clone());
        if let Some(err) = self.fail_with.lock().clone() {
            return Err(err);
        }
        Ok(ProviderResult {
            provider_identifier: self.identifier.clone(),
            success: true,
            error_message: None,
            delivery_time_ms: 1,
        })
    }

    fn validate_config(&self) -> bool {
        self.validate_config.load(Ordering::SeqCst)
    }

    async fn health_check(&self, _timeout: Duration) -> HealthStatus {
        *self.health.lock()
    }
}

#[cfg(test)]
#[path = "fake_provider_tests.rs"]
mod tests;
