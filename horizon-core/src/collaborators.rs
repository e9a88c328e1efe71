//! Collaborator traits the core depends on but does not implement.
//!
//! The exchange, the history store, and the predictive oracle live behind
//! these seams so the core can be driven live, from a replay, or from a test
//! without modification. In-memory implementations live in `paper`.

use crate::config::HorizonConfig;
use crate::domain::OrderIntent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure reported by the exchange collaborator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OrderError {
    #[error("exchange rejected order {intent}: {reason}")]
    Rejected { intent: OrderIntent, reason: String },

    #[error("exchange transport error: {0}")]
    Transport(String),
}

/// Failure reading history from the store.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HistoryError {
    #[error("history store unavailable: {0}")]
    Unavailable(String),

    #[error("history store query failed: {0}")]
    Query(String),
}

/// Failure produced by the oracle itself (as opposed to an out-of-range output).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OracleError {
    #[error("oracle not loaded: {0}")]
    NotLoaded(String),

    #[error("oracle needs at least {required} prices, got {available}")]
    WindowTooShort { required: usize, available: usize },

    #[error("oracle prediction failed: {0}")]
    Prediction(String),
}

/// Exchange access. Each call is a round-trip owned by the implementation;
/// retries and backoff belong there, not in the core.
pub trait Exchange {
    /// Current price.
    fn price(&mut self) -> Result<f64, OrderError>;

    /// Signed held exposure in native units.
    fn position(&mut self) -> Result<f64, OrderError>;

    /// Place one market order.
    fn place_order(&mut self, intent: &OrderIntent) -> Result<(), OrderError>;

    /// Cancel all open orders. Called by the driver before each tick.
    fn cancel_all(&mut self) -> Result<(), OrderError>;
}

/// A timestamped historical price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPrice {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

/// Historical price source used for warm-start.
pub trait HistoryStore {
    /// Up to `n` most recent samples, oldest first. May return fewer than `n`.
    fn history(&self, n: usize) -> Result<Vec<HistoricalPrice>, HistoryError>;
}

/// Black-box predictor: window of prices in, up-probability out.
///
/// The core validates the returned value; implementations need not clamp.
pub trait Oracle: Send + Sync {
    fn predict_up_probability(
        &self,
        horizon: &HorizonConfig,
        window: &[f64],
    ) -> Result<f64, OracleError>;
}

impl<F> Oracle for F
where
    F: Fn(&HorizonConfig, &[f64]) -> Result<f64, OracleError> + Send + Sync,
{
    fn predict_up_probability(
        &self,
        horizon: &HorizonConfig,
        window: &[f64],
    ) -> Result<f64, OracleError> {
        self(horizon, window)
    }
}
