//! Oracles that need no model: recorded probabilities and a momentum heuristic.

use crate::collaborators::{Oracle, OracleError};
use crate::config::HorizonConfig;
use crate::domain::mean_std;
use std::collections::HashMap;

/// Probabilities recorded for a single tick.
///
/// A per-horizon entry wins over the shared one. A horizon with neither
/// yields `OracleError::Prediction`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordedOracle {
    shared: Option<f64>,
    per_horizon: HashMap<String, f64>,
}

impl RecordedOracle {
    /// Same probability for every horizon.
    pub fn shared(p_up: f64) -> Self {
        Self {
            shared: Some(p_up),
            per_horizon: HashMap::new(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_shared(mut self, p_up: Option<f64>) -> Self {
        self.shared = p_up;
        self
    }

    pub fn with_horizon(mut self, name: impl Into<String>, p_up: f64) -> Self {
        self.per_horizon.insert(name.into(), p_up);
        self
    }

    pub fn get(&self, horizon: &str) -> Option<f64> {
        self.per_horizon.get(horizon).copied().or(self.shared)
    }
}

impl Oracle for RecordedOracle {
    fn predict_up_probability(
        &self,
        horizon: &HorizonConfig,
        _window: &[f64],
    ) -> Result<f64, OracleError> {
        self.get(&horizon.name).ok_or_else(|| {
            OracleError::Prediction(format!("no recorded probability for {}", horizon.name))
        })
    }
}

/// Logistic of the latest price's z-score within the window.
///
/// `p_up = 1 / (1 + exp(-gain * z))` with `z = (last - mean) / std`.
/// A flat window gives 0.5.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MomentumOracle {
    gain: f64,
}

impl MomentumOracle {
    pub fn new(gain: f64) -> Self {
        Self { gain }
    }
}

impl Default for MomentumOracle {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Oracle for MomentumOracle {
    fn predict_up_probability(
        &self,
        horizon: &HorizonConfig,
        window: &[f64],
    ) -> Result<f64, OracleError> {
        if window.len() < horizon.k || window.is_empty() {
            return Err(OracleError::WindowTooShort {
                required: horizon.k.max(1),
                available: window.len(),
            });
        }
        let Some((mean, std)) = mean_std(window.iter().copied()) else {
            return Ok(0.5);
        };
        if std == 0.0 || !std.is_finite() {
            return Ok(0.5);
        }
        let last = window[window.len() - 1];
        let z = (last - mean) / std;
        Ok(1.0 / (1.0 + (-self.gain * z).exp()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PriceWindow;

    fn horizon(name: &str, k: usize) -> HorizonConfig {
        HorizonConfig::new(name, k, 2)
    }

    #[test]
    fn recorded_prefers_per_horizon_value() {
        let oracle = RecordedOracle::shared(0.4).with_horizon("fast", 0.9);
        assert_eq!(
            oracle.predict_up_probability(&horizon("fast", 3), &[]),
            Ok(0.9)
        );
        assert_eq!(
            oracle.predict_up_probability(&horizon("slow", 3), &[]),
            Ok(0.4)
        );
    }

    #[test]
    fn recorded_without_value_errors() {
        let oracle = RecordedOracle::empty().with_horizon("fast", 0.9);
        assert!(matches!(
            oracle.predict_up_probability(&horizon("slow", 3), &[]),
            Err(OracleError::Prediction(_))
        ));
    }

    #[test]
    fn momentum_is_bullish_after_a_rise() {
        let p = MomentumOracle::default()
            .predict_up_probability(&horizon("h", 3), &[100.0, 101.0, 103.0])
            .unwrap();
        assert!(p > 0.5 && p < 1.0);
    }

    #[test]
    fn momentum_is_bearish_after_a_fall() {
        let p = MomentumOracle::new(2.0)
            .predict_up_probability(&horizon("h", 3), &[103.0, 101.0, 100.0])
            .unwrap();
        assert!(p < 0.5 && p > 0.0);
    }

    #[test]
    fn momentum_z_score_uses_window_std() {
        let prices = [100.0, 101.0, 103.0];
        let mut window = PriceWindow::new(3);
        window.fill_from(&prices);
        let z = (103.0 - window.mean().unwrap()) / window.std_dev();

        let p = MomentumOracle::default()
            .predict_up_probability(&horizon("h", 3), &prices)
            .unwrap();
        assert!((p - 1.0 / (1.0 + (-z).exp())).abs() < 1e-12);
    }

    #[test]
    fn momentum_flat_window_is_neutral() {
        let p = MomentumOracle::default()
            .predict_up_probability(&horizon("h", 3), &[5.0, 5.0, 5.0])
            .unwrap();
        assert_eq!(p, 0.5);
    }

    #[test]
    fn momentum_rejects_short_window() {
        assert_eq!(
            MomentumOracle::default().predict_up_probability(&horizon("h", 3), &[1.0]),
            Err(OracleError::WindowTooShort {
                required: 3,
                available: 1
            })
        );
    }
}
