//! Order intents handed to the execution collaborator.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "BUY"),
            OrderSide::Sell => write!(f, "SELL"),
        }
    }
}

/// A single market order the reconciler wants placed. `size` is in native
/// units (e.g. BTC) and always positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderIntent {
    pub side: OrderSide,
    pub size: f64,
}

impl OrderIntent {
    /// Signed change in exposure this intent produces.
    pub fn signed_size(&self) -> f64 {
        match self.side {
            OrderSide::Buy => self.size,
            OrderSide::Sell => -self.size,
        }
    }
}

impl fmt::Display for OrderIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:.6}", self.side, self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_size_follows_side() {
        let buy = OrderIntent {
            side: OrderSide::Buy,
            size: 0.002,
        };
        let sell = OrderIntent {
            side: OrderSide::Sell,
            size: 0.002,
        };
        assert_eq!(buy.signed_size(), 0.002);
        assert_eq!(sell.signed_size(), -0.002);
    }

    #[test]
    fn display() {
        let buy = OrderIntent {
            side: OrderSide::Buy,
            size: 0.25,
        };
        assert_eq!(buy.to_string(), "BUY 0.250000");
    }
}
