//! Decision core: per-horizon engines and the per-tick pipeline stages.
//!
//! Each tick runs three stages:
//!
//! 1. Decide: every engine observes the price and advances its own position
//! 2. Aggregate: sum engine signals into a net lot target
//! 3. Reconcile: diff the target against held exposure, emit at most one order
//!
//! Warm-start alignment (`warmup`) loads engine windows from history before
//! the first tick.

pub mod aggregate;
pub mod decision;
pub mod reconcile;
pub mod warmup;

pub use aggregate::{aggregate, target_exposure};
pub use decision::{predicted_side, DecisionEngine, StepError, TickStatus};
pub use reconcile::{ExecutionReconciler, LOT_EPSILON};
pub use warmup::{
    align, fetch_length, required_history, valid_start_index, AlignError, HistoryQuality,
};
