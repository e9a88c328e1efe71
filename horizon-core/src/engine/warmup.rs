//! Warm-start alignment.
//!
//! The oracle's features are sliding-window indicators. Over the first few
//! samples of any history those indicators are underfilled (zero-padded), so
//! a window presented to the oracle must start after the longest of them is
//! full. `valid_start_index` is that offset; `align` skips it and takes
//! exactly k samples.

use crate::config::HorizonConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlignError {
    #[error("insufficient history: need {required} samples, have {available}")]
    InsufficientHistory { required: usize, available: usize },
}

/// First history index at which every indicator window is full.
pub fn valid_start_index(cfg: &HorizonConfig) -> usize {
    let w = &cfg.indicators;
    let sma_start = w.sma_short.max(w.sma_mid).max(w.sma_long).saturating_sub(1);
    let band_start = w.band_window.saturating_sub(1);
    let macd_start = w.macd_long.saturating_sub(1) + w.macd_signal.saturating_sub(1);
    let osc_start = w.osc_window;

    sma_start.max(band_start).max(macd_start).max(osc_start)
}

/// Minimum history length for `align` to succeed.
pub fn required_history(cfg: &HorizonConfig) -> usize {
    valid_start_index(cfg) + cfg.k
}

/// The k samples starting right after the zero-padded prefix.
///
/// This is not the k most recent samples unless the history is exactly
/// `required_history` long.
pub fn align<'a>(history: &'a [f64], cfg: &HorizonConfig) -> Result<&'a [f64], AlignError> {
    let start = valid_start_index(cfg);
    let required = start + cfg.k;
    if history.len() < required {
        return Err(AlignError::InsufficientHistory {
            required,
            available: history.len(),
        });
    }
    Ok(&history[start..required])
}

/// Number of samples to request from the history store so that every
/// horizon can be warm-started from a single query.
///
/// `margin` pads the request for gaps in the store; the result is never
/// below the strict requirement.
pub fn fetch_length(horizons: &[HorizonConfig], margin: f64) -> usize {
    let max_k = horizons.iter().map(|h| h.k).max().unwrap_or(0);
    let max_start = horizons.iter().map(valid_start_index).max().unwrap_or(0);
    let effective = max_k + max_start;
    let padded = (effective as f64 * margin).floor() as usize;
    padded.max(effective)
}

/// Advisory quality report on a fetched history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryQuality {
    pub count: usize,
    pub expected: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub issues: Vec<String>,
}

impl HistoryQuality {
    /// Below this share of the expected count the history is flagged as sparse.
    pub const MIN_COVERAGE: f64 = 0.3;
    /// Max/min price ratio above which the history is flagged as anomalous.
    pub const MAX_RANGE_RATIO: f64 = 2.0;

    pub fn assess(prices: &[f64], expected: usize) -> Self {
        if prices.is_empty() {
            return Self {
                count: 0,
                expected,
                min: None,
                max: None,
                mean: None,
                issues: vec!["no data available".to_string()],
            };
        }

        let mut issues = Vec::new();
        let count = prices.len();

        if (count as f64) < expected as f64 * Self::MIN_COVERAGE {
            issues.push(format!("insufficient data: {count}/{expected}"));
        }

        let min = prices.iter().copied().fold(f64::INFINITY, f64::min);
        let max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = prices.iter().sum::<f64>() / count as f64;

        if min <= 0.0 {
            issues.push("invalid price: zero or negative values found".to_string());
        } else if max / min > Self::MAX_RANGE_RATIO {
            issues.push(format!("extreme price variation: {min:.0} to {max:.0}"));
        }
        if prices.iter().any(|p| !p.is_finite()) {
            issues.push("invalid price: non-finite values found".to_string());
        }

        Self {
            count,
            expected,
            min: Some(min),
            max: Some(max),
            mean: Some(mean),
            issues,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }
}
