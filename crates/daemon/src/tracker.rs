// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Delivery tracker: per-dispatch per-provider result table (spec.md §4.8).
//!
//! Mutated only by the dispatcher's worker tasks; readers get a consistent
//! snapshot via `get` (spec.md §5 shared-resource policy).

use crate::error::TrackerError;
use moverd_core::{Clock, DeliveryId, DispatchResult, DispatchStatus, Message, ProviderResult};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Per-`delivery_id` result table (spec.md §4.8).
pub struct DeliveryTracker<C: Clock> {
    clock: C,
    deliveries: Mutex<HashMap<DeliveryId, DispatchResult>>,
}

impl<C: Clock> DeliveryTracker<C> {
    pub fn new(clock: C) -> Self {
        Self { clock, deliveries: Mutex::new(HashMap::new()) }
    }

    /// Begin tracking a dispatch. Initial status is `pending` until the
    /// first provider result arrives (spec.md §4.8 aggregation rule).
    pub fn track(&self, delivery_id: DeliveryId, message: Message, providers: Vec<String>) {
        let result = DispatchResult {
            delivery_id: delivery_id.clone(),
            status: DispatchStatus::aggregate(&providers, &HashMap::new()),
            message,
            providers,
            results: HashMap::new(),
            created_at: self.clock.now(),
            completed_at: None,
        };
        self.deliveries.lock().insert(delivery_id, result);
    }

    /// Record one provider's outcome and recompute the aggregate status.
    pub fn update(
        &self,
        delivery_id: &DeliveryId,
        provider: &str,
        success: bool,
        error: Option<String>,
        delivery_time_ms: u64,
    ) -> Result<(), TrackerError> {
        let mut deliveries = self.deliveries.lock();
        let result = deliveries.get_mut(delivery_id).ok_or_else(|| TrackerError::UnknownDelivery(delivery_id.clone()))?;

        result.results.insert(
            provider.to_string(),
            ProviderResult {
                provider_identifier: provider.to_string(),
                success,
                error_message: error,
                delivery_time_ms,
            },
        );
        result.status = DispatchStatus::aggregate(&result.providers, &result.results);
        if result.is_terminal() {
            result.completed_at = Some(self.clock.now());
        }
        Ok(())
    }

    /// A consistent snapshot of the dispatch's current state.
    pub fn get(&self, delivery_id: &DeliveryId) -> Option<DispatchResult> {
        self.deliveries.lock().get(delivery_id).cloned()
    }

    /// Mark every provider that has not yet reported as cancelled
    /// (spec.md §5 "cancelling a dispatch mid-fanout surfaces `failed` with
    /// per-provider `error = Cancelled` entries").
    pub fn cancel_outstanding(&self, delivery_id: &DeliveryId) -> Result<(), TrackerError> {
        let mut deliveries = self.deliveries.lock();
        let result = deliveries.get_mut(delivery_id).ok_or_else(|| TrackerError::UnknownDelivery(delivery_id.clone()))?;
        let now = self.clock.now();
        for provider in result.providers.clone() {
            result.results.entry(provider.clone()).or_insert(ProviderResult {
                provider_identifier: provider,
                success: false,
                error_message: Some("cancelled".to_string()),
                delivery_time_ms: 0,
            });
        }
        result.status = DispatchStatus::aggregate(&result.providers, &result.results);
        result.completed_at = Some(now);
        Ok(())
    }
}

#[cfg(test)]
#[path = "tracker_tests.rs"]
mod tests;
