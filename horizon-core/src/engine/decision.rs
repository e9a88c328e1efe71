//! Decision engine: one per horizon.
//!
//! Owns a bounded price window and a `Position`. Each tick appends the price,
//! and once the window is full asks the oracle for an up-probability and
//! advances the position by exactly one transition. Engines share no state.

use crate::collaborators::{Oracle, OracleError};
use crate::config::{ConfigError, HorizonConfig};
use crate::domain::{
    ConfigHash, ExitRules, Position, PriceWindow, Side, StepInput, Transition,
};
use crate::engine::warmup::{self, AlignError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Errors isolated to one engine for one tick. The position is left unchanged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StepError {
    #[error("oracle returned invalid probability {probability}")]
    InvalidOracleOutput { probability: f64 },

    #[error(transparent)]
    Oracle(#[from] OracleError),
}

/// What an engine did on a tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TickStatus {
    /// Window not yet full; no decision made.
    Warming { have: usize, need: usize },
    /// Decision made.
    Stepped(Transition),
}

/// Map an up-probability to a predicted side.
///
/// `p_up > up` is long, `p_up <= down` is short, anything between is no call.
/// With equal thresholds there is no neutral band and a probability exactly at
/// the threshold resolves to short.
pub fn predicted_side(p_up: f64, up_threshold: f64, down_threshold: f64) -> Option<Side> {
    if p_up > up_threshold {
        Some(Side::Long)
    } else if p_up <= down_threshold {
        Some(Side::Short)
    } else {
        None
    }
}

#[derive(Debug, Clone)]
pub struct DecisionEngine {
    config: HorizonConfig,
    rules: ExitRules,
    fingerprint: ConfigHash,
    window: PriceWindow,
    position: Position,
}

impl DecisionEngine {
    pub fn new(config: HorizonConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            rules: config.exit_rules(),
            fingerprint: config.fingerprint(),
            window: PriceWindow::new(config.k),
            position: Position::Flat,
            config,
        })
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &HorizonConfig {
        &self.config
    }

    pub fn fingerprint(&self) -> &ConfigHash {
        &self.fingerprint
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn window(&self) -> &PriceWindow {
        &self.window
    }

    /// Window holds k samples.
    pub fn is_ready(&self) -> bool {
        self.window.is_full()
    }

    /// Directional exposure wanted by this horizon: -1, 0, or +1.
    pub fn signal(&self) -> i32 {
        self.position.signal()
    }

    /// Append a price to the window.
    pub fn observe(&mut self, price: f64) {
        self.window.push(price);
    }

    /// Back to the restart state: flat with an empty window.
    pub fn reset(&mut self) {
        self.window.clear();
        self.position = Position::Flat;
    }

    /// Load the window from history, skipping the zero-padded prefix.
    ///
    /// On `InsufficientHistory` the engine is left untouched (unwarmed).
    pub fn warm_start(&mut self, history: &[f64]) -> Result<(), AlignError> {
        let aligned = warmup::align(history, &self.config)?;
        self.window.fill_from(aligned);
        info!(
            horizon = %self.config.name,
            skipped = warmup::valid_start_index(&self.config),
            k = self.config.k,
            "warm-started from history"
        );
        Ok(())
    }

    /// Advance the position by one transition.
    ///
    /// `volatility` is the stddev of the current window and `p_up` the oracle
    /// output for it. An out-of-range or NaN probability is rejected and the
    /// position is not touched.
    pub fn step(
        &mut self,
        price: f64,
        volatility: f64,
        p_up: f64,
    ) -> Result<Transition, StepError> {
        if !(0.0..=1.0).contains(&p_up) {
            return Err(StepError::InvalidOracleOutput { probability: p_up });
        }

        let predicted = predicted_side(p_up, self.config.up_threshold, self.config.down_threshold);
        let input = StepInput {
            price,
            volatility,
            predicted,
        };
        let (next, transition) = self.position.step(&input, &self.rules);
        self.position = next;
        self.log_transition(&transition, price, p_up);
        Ok(transition)
    }

    /// Observe the price, then decide if the window is full.
    pub fn tick(&mut self, price: f64, oracle: &dyn Oracle) -> Result<TickStatus, StepError> {
        self.observe(price);
        if !self.is_ready() {
            debug!(
                horizon = %self.config.name,
                have = self.window.len(),
                need = self.config.k,
                "not ready"
            );
            return Ok(TickStatus::Warming {
                have: self.window.len(),
                need: self.config.k,
            });
        }

        let window = self.window.to_vec();
        let volatility = self.window.std_dev();
        let p_up = oracle.predict_up_probability(&self.config, &window)?;
        self.step(price, volatility, p_up).map(TickStatus::Stepped)
    }

    fn log_transition(&self, transition: &Transition, price: f64, p_up: f64) {
        let horizon = self.config.name.as_str();
        match *transition {
            Transition::StayFlat => debug!(horizon, p_up, "flat"),
            Transition::Hold {
                remaining_ticks,
                risk,
            } => debug!(horizon, remaining_ticks, risk, "holding"),
            Transition::Open { side } => info!(horizon, %side, price, p_up, "open"),
            Transition::Close { side, reason, risk } => {
                info!(horizon, %side, %reason, risk, price, "close")
            }
            Transition::Renew { side, reason, risk } => {
                info!(horizon, %side, %reason, risk, price, "renew same side")
            }
            Transition::Flip {
                from,
                to,
                reason,
                risk,
            } => info!(horizon, %from, %to, %reason, risk, price, "flip"),
        }
    }
}
