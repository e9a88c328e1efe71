//! In-memory history store.

use crate::collaborators::{HistoricalPrice, HistoryError, HistoryStore};
use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, Default)]
pub struct VecHistoryStore {
    samples: Vec<HistoricalPrice>,
}

impl VecHistoryStore {
    /// Store over `samples`, sorted by timestamp.
    pub fn new(mut samples: Vec<HistoricalPrice>) -> Self {
        samples.sort_by_key(|s| s.timestamp);
        Self { samples }
    }

    /// Evenly spaced samples ending at `end`.
    pub fn from_prices(prices: &[f64], end: DateTime<Utc>, interval: Duration) -> Self {
        let n = prices.len() as i32;
        let samples = prices
            .iter()
            .enumerate()
            .map(|(i, &price)| HistoricalPrice {
                timestamp: end - interval * (n - 1 - i as i32),
                price,
            })
            .collect();
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl HistoryStore for VecHistoryStore {
    fn history(&self, n: usize) -> Result<Vec<HistoricalPrice>, HistoryError> {
        let skip = self.samples.len().saturating_sub(n);
        Ok(self.samples[skip..].to_vec())
    }
}
