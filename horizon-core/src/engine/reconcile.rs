//! Execution reconciliation: target lots vs held lots → at most one order.
//!
//! Deltas are computed in lots and scaled to native units only when the
//! intent is built, so `3 - 1` lots at 0.001 is exactly 0.002.

use crate::domain::{OrderIntent, OrderSide};
use tracing::debug;

/// Lot deltas smaller than this are treated as zero.
pub const LOT_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionReconciler {
    unit_size: f64,
    min_order_size: Option<f64>,
}

impl ExecutionReconciler {
    pub fn new(unit_size: f64) -> Self {
        assert!(unit_size > 0.0, "unit_size must be positive");
        Self {
            unit_size,
            min_order_size: None,
        }
    }

    /// Suppress intents smaller than `min` native units.
    pub fn with_min_order_size(mut self, min: Option<f64>) -> Self {
        self.min_order_size = min;
        self
    }

    /// Convert a held exposure in native units to lots.
    pub fn lots_from_exposure(&self, exposure: f64) -> f64 {
        exposure / self.unit_size
    }

    /// Diff target against actual, both in lots. No intent when they agree.
    pub fn reconcile(&self, target_lots: f64, actual_lots: f64) -> Option<OrderIntent> {
        let delta = target_lots - actual_lots;
        if delta.abs() < LOT_EPSILON {
            return None;
        }

        let side = if delta > 0.0 {
            OrderSide::Buy
        } else {
            OrderSide::Sell
        };
        let size = delta.abs() * self.unit_size;

        if let Some(min) = self.min_order_size {
            if size < min {
                debug!(%side, size, min, "order below minimum size, skipped");
                return None;
            }
        }

        Some(OrderIntent { side, size })
    }
}
