//! Bounded price window: append-only, oldest sample evicted at capacity.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceWindow {
    capacity: usize,
    prices: VecDeque<f64>,
}

impl PriceWindow {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 1, "window capacity must be >= 1");
        Self {
            capacity,
            prices: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a sample, evicting the oldest one when full.
    pub fn push(&mut self, price: f64) {
        if self.prices.len() == self.capacity {
            self.prices.pop_front();
        }
        self.prices.push_back(price);
    }

    /// Replace the contents with the last `capacity` samples of `prices`.
    pub fn fill_from(&mut self, prices: &[f64]) {
        self.prices.clear();
        let skip = prices.len().saturating_sub(self.capacity);
        self.prices.extend(prices[skip..].iter().copied());
    }

    pub fn clear(&mut self) {
        self.prices.clear();
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.prices.len() == self.capacity
    }

    pub fn last(&self) -> Option<f64> {
        self.prices.back().copied()
    }

    /// Samples oldest first.
    pub fn to_vec(&self) -> Vec<f64> {
        self.prices.iter().copied().collect()
    }

    pub fn mean(&self) -> Option<f64> {
        if self.prices.is_empty() {
            return None;
        }
        Some(self.prices.iter().sum::<f64>() / self.prices.len() as f64)
    }

    /// Population standard deviation (divide by N). Zero for an empty window.
    pub fn std_dev(&self) -> f64 {
        mean_std(self.prices.iter().copied()).map_or(0.0, |(_, std)| std)
    }
}

/// Mean and population standard deviation of `prices`. None when empty.
pub fn mean_std<I>(prices: I) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = f64>,
    I::IntoIter: Clone,
{
    let iter = prices.into_iter();
    let (count, sum) = iter.clone().fold((0usize, 0.0), |(n, s), p| (n + 1, s + p));
    if count == 0 {
        return None;
    }
    let n = count as f64;
    let mean = sum / n;
    let variance = iter.map(|p| (p - mean).powi(2)).sum::<f64>() / n;
    Some((mean, variance.sqrt()))
}
