//! Per-horizon position and its tick transition.
//!
//! A position is either flat or holding one side with a countdown. The
//! transition is a pure function of the prior position, the tick's price and
//! window volatility, and the side predicted by the oracle.

use super::side::Side;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position owned by a single decision engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum Position {
    #[default]
    Flat,
    Holding {
        side: Side,
        /// Ticks left before the position is reconsidered. Always >= 1 while held.
        remaining_ticks: u32,
        entry_price: f64,
        /// Population stddev of the engine window on the entry tick.
        entry_volatility: f64,
    },
}

/// Exit parameters for a held position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExitRules {
    /// Ticks a fresh position is held (p).
    pub hold_ticks: u32,
    /// Take-profit threshold in entry-volatility units (rikaku).
    pub take_profit: f64,
    /// Stop-loss threshold in entry-volatility units (sonkiri).
    pub stop_loss: f64,
}

/// One tick of input to the transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepInput {
    pub price: f64,
    pub volatility: f64,
    pub predicted: Option<Side>,
}

/// Why a held position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitReason {
    Expired,
    TakeProfit,
    StopLoss,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::Expired => write!(f, "expired"),
            ExitReason::TakeProfit => write!(f, "take_profit"),
            ExitReason::StopLoss => write!(f, "stop_loss"),
        }
    }
}

/// Labelled outcome of a single transition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Transition {
    StayFlat,
    Open {
        side: Side,
    },
    Hold {
        remaining_ticks: u32,
        risk: f64,
    },
    /// Exited with no predicted side.
    Close {
        side: Side,
        reason: ExitReason,
        risk: f64,
    },
    /// Exited and reopened on the same side in the same tick.
    Renew {
        side: Side,
        reason: ExitReason,
        risk: f64,
    },
    /// Exited and reopened on the opposite side in the same tick.
    Flip {
        from: Side,
        to: Side,
        reason: ExitReason,
        risk: f64,
    },
}

impl Position {
    /// Fresh position on `side` entered at this tick.
    pub fn open(side: Side, rules: &ExitRules, price: f64, volatility: f64) -> Self {
        Position::Holding {
            side,
            remaining_ticks: rules.hold_ticks,
            entry_price: price,
            entry_volatility: volatility,
        }
    }

    pub fn is_flat(&self) -> bool {
        matches!(self, Position::Flat)
    }

    pub fn side(&self) -> Option<Side> {
        match self {
            Position::Flat => None,
            Position::Holding { side, .. } => Some(*side),
        }
    }

    /// Directional exposure this position wants: -1, 0, or +1.
    pub fn signal(&self) -> i32 {
        match self {
            Position::Holding {
                side,
                remaining_ticks,
                ..
            } if *remaining_ticks > 0 => side.sign(),
            _ => 0,
        }
    }

    /// Advance one tick.
    pub fn step(&self, input: &StepInput, rules: &ExitRules) -> (Position, Transition) {
        match *self {
            Position::Flat => match input.predicted {
                Some(side) => (
                    Position::open(side, rules, input.price, input.volatility),
                    Transition::Open { side },
                ),
                None => (Position::Flat, Transition::StayFlat),
            },
            Position::Holding {
                side,
                remaining_ticks,
                entry_price,
                entry_volatility,
            } => {
                let remaining = remaining_ticks.saturating_sub(1);
                let risk = risk(side, entry_price, entry_volatility, input.price);

                let reason = if remaining == 0 {
                    Some(ExitReason::Expired)
                } else if risk > rules.take_profit {
                    Some(ExitReason::TakeProfit)
                } else if risk < -rules.stop_loss {
                    Some(ExitReason::StopLoss)
                } else {
                    None
                };

                let Some(reason) = reason else {
                    return (
                        Position::Holding {
                            side,
                            remaining_ticks: remaining,
                            entry_price,
                            entry_volatility,
                        },
                        Transition::Hold {
                            remaining_ticks: remaining,
                            risk,
                        },
                    );
                };

                match input.predicted {
                    Some(next) if next == side => (
                        Position::open(side, rules, input.price, input.volatility),
                        Transition::Renew { side, reason, risk },
                    ),
                    Some(next) => (
                        Position::open(next, rules, input.price, input.volatility),
                        Transition::Flip {
                            from: side,
                            to: next,
                            reason,
                            risk,
                        },
                    ),
                    None => (Position::Flat, Transition::Close { side, reason, risk }),
                }
            }
        }
    }
}

/// Unrealized move in units of entry volatility, signed by side.
///
/// A zero entry volatility (flat entry window) yields zero risk, so neither
/// take-profit nor stop-loss can fire on it.
pub fn risk(side: Side, entry_price: f64, entry_volatility: f64, price: f64) -> f64 {
    if entry_volatility == 0.0 {
        return 0.0;
    }
    (price - entry_price) * f64::from(side.sign()) / entry_volatility
}
