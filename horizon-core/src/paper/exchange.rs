//! In-memory exchange: scripted prices, immediate fills at the current price.

use crate::collaborators::{Exchange, OrderError};
use crate::domain::OrderIntent;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A filled paper order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaperFill {
    pub intent: OrderIntent,
    pub price: f64,
    pub position_after: f64,
}

#[derive(Debug, Clone, Default)]
pub struct PaperExchange {
    feed: VecDeque<f64>,
    last_price: Option<f64>,
    position: f64,
    fills: Vec<PaperFill>,
    cancel_calls: usize,
    reject_next: Option<String>,
}

impl PaperExchange {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exchange whose `price()` calls return `prices` in order.
    pub fn with_prices(prices: impl IntoIterator<Item = f64>) -> Self {
        Self {
            feed: prices.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn push_price(&mut self, price: f64) {
        self.feed.push_back(price);
    }

    /// Prices not yet consumed by `price()`.
    pub fn remaining_prices(&self) -> usize {
        self.feed.len()
    }

    /// Start from a non-zero held exposure.
    pub fn with_position(mut self, position: f64) -> Self {
        self.position = position;
        self
    }

    /// Make the next `place_order` fail with `reason`.
    pub fn reject_next_order(&mut self, reason: impl Into<String>) {
        self.reject_next = Some(reason.into());
    }

    pub fn held(&self) -> f64 {
        self.position
    }

    pub fn last_price(&self) -> Option<f64> {
        self.last_price
    }

    pub fn fills(&self) -> &[PaperFill] {
        &self.fills
    }

    pub fn cancel_calls(&self) -> usize {
        self.cancel_calls
    }

    /// Sum of filled sizes in native units.
    pub fn traded_volume(&self) -> f64 {
        self.fills.iter().map(|f| f.intent.size).sum()
    }
}

impl Exchange for PaperExchange {
    fn price(&mut self) -> Result<f64, OrderError> {
        let price = self
            .feed
            .pop_front()
            .ok_or_else(|| OrderError::Transport("price feed exhausted".to_string()))?;
        self.last_price = Some(price);
        Ok(price)
    }

    fn position(&mut self) -> Result<f64, OrderError> {
        Ok(self.position)
    }

    fn place_order(&mut self, intent: &OrderIntent) -> Result<(), OrderError> {
        if let Some(reason) = self.reject_next.take() {
            return Err(OrderError::Rejected {
                intent: *intent,
                reason,
            });
        }
        let price = self
            .last_price
            .ok_or_else(|| OrderError::Transport("no price observed yet".to_string()))?;

        self.position += intent.signed_size();
        self.fills.push(PaperFill {
            intent: *intent,
            price,
            position_after: self.position,
        });
        Ok(())
    }

    fn cancel_all(&mut self) -> Result<(), OrderError> {
        self.cancel_calls += 1;
        Ok(())
    }
}
