//! Trader and per-horizon configuration.
//!
//! Configuration is loaded from TOML and validated once at construction.
//! Nothing here changes while ticks are running.

use crate::domain::{ConfigHash, ExitRules};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

/// Configuration errors. Raised at construction time only.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("horizon '{horizon}': {field} must be positive (got {value})")]
    NonPositive {
        horizon: String,
        field: &'static str,
        value: f64,
    },

    #[error("horizon '{horizon}': {field} must be within [0, 1] (got {value})")]
    ThresholdOutOfRange {
        horizon: String,
        field: &'static str,
        value: f64,
    },

    #[error("horizon '{horizon}': down_threshold {down} exceeds up_threshold {up}")]
    ThresholdOrder { horizon: String, down: f64, up: f64 },

    #[error("horizon name must not be empty")]
    EmptyName,

    #[error("duplicate horizon name '{0}'")]
    DuplicateName(String),

    #[error("at least one horizon must be configured")]
    NoHorizons,

    #[error("{field} is invalid: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },

    #[error("read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Indicator window sizes the oracle's feature pipeline uses.
///
/// The engine never computes these indicators; the sizes only determine how
/// much leading history is underfilled and must be skipped on warm-start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorWindows {
    pub sma_short: usize,
    pub sma_mid: usize,
    pub sma_long: usize,
    pub band_window: usize,
    pub macd_short: usize,
    pub macd_long: usize,
    pub macd_signal: usize,
    pub osc_window: usize,
}

impl Default for IndicatorWindows {
    fn default() -> Self {
        Self {
            sma_short: 5,
            sma_mid: 20,
            sma_long: 60,
            band_window: 20,
            macd_short: 12,
            macd_long: 26,
            macd_signal: 9,
            osc_window: 14,
        }
    }
}

impl IndicatorWindows {
    fn fields(&self) -> [(&'static str, usize); 8] {
        [
            ("sma_short", self.sma_short),
            ("sma_mid", self.sma_mid),
            ("sma_long", self.sma_long),
            ("band_window", self.band_window),
            ("macd_short", self.macd_short),
            ("macd_long", self.macd_long),
            ("macd_signal", self.macd_signal),
            ("osc_window", self.osc_window),
        ]
    }
}

/// Immutable configuration of one forecast horizon (one decision engine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonConfig {
    pub name: String,
    /// Window length: number of most recent prices the oracle sees.
    pub k: usize,
    /// Hold length: ticks a fresh position is held.
    pub p: u32,
    /// Take-profit threshold, in entry-volatility units.
    #[serde(default = "default_rikaku")]
    pub rikaku: f64,
    /// Stop-loss threshold, in entry-volatility units.
    #[serde(default = "default_sonkiri")]
    pub sonkiri: f64,
    #[serde(default = "default_threshold")]
    pub up_threshold: f64,
    #[serde(default = "default_threshold")]
    pub down_threshold: f64,
    #[serde(default)]
    pub indicators: IndicatorWindows,
}

fn default_rikaku() -> f64 {
    2.0
}

fn default_sonkiri() -> f64 {
    1.0
}

fn default_threshold() -> f64 {
    0.5
}

impl HorizonConfig {
    /// Horizon with default thresholds and indicator windows.
    pub fn new(name: impl Into<String>, k: usize, p: u32) -> Self {
        Self {
            name: name.into(),
            k,
            p,
            rikaku: default_rikaku(),
            sonkiri: default_sonkiri(),
            up_threshold: default_threshold(),
            down_threshold: default_threshold(),
            indicators: IndicatorWindows::default(),
        }
    }

    pub fn with_risk(mut self, rikaku: f64, sonkiri: f64) -> Self {
        self.rikaku = rikaku;
        self.sonkiri = sonkiri;
        self
    }

    pub fn with_thresholds(mut self, up: f64, down: f64) -> Self {
        self.up_threshold = up;
        self.down_threshold = down;
        self
    }

    pub fn with_indicators(mut self, indicators: IndicatorWindows) -> Self {
        self.indicators = indicators;
        self
    }

    pub fn exit_rules(&self) -> ExitRules {
        ExitRules {
            hold_ticks: self.p,
            take_profit: self.rikaku,
            stop_loss: self.sonkiri,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::EmptyName);
        }

        let non_positive = |field: &'static str, value: f64| ConfigError::NonPositive {
            horizon: self.name.clone(),
            field,
            value,
        };

        if self.k == 0 {
            return Err(non_positive("k", 0.0));
        }
        if self.p == 0 {
            return Err(non_positive("p", 0.0));
        }
        // `!(x > 0.0)` also rejects NaN
        if !(self.rikaku > 0.0) || !self.rikaku.is_finite() {
            return Err(non_positive("rikaku", self.rikaku));
        }
        if !(self.sonkiri > 0.0) || !self.sonkiri.is_finite() {
            return Err(non_positive("sonkiri", self.sonkiri));
        }
        for (field, value) in self.indicators.fields() {
            if value == 0 {
                return Err(non_positive(field, 0.0));
            }
        }

        for (field, value) in [
            ("up_threshold", self.up_threshold),
            ("down_threshold", self.down_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ThresholdOutOfRange {
                    horizon: self.name.clone(),
                    field,
                    value,
                });
            }
        }
        if self.down_threshold > self.up_threshold {
            return Err(ConfigError::ThresholdOrder {
                horizon: self.name.clone(),
                down: self.down_threshold,
                up: self.up_threshold,
            });
        }

        Ok(())
    }

    /// Stable fingerprint of every parameter, including the name.
    pub fn fingerprint(&self) -> ConfigHash {
        let w = &self.indicators;
        let canonical = json!({
            "name": self.name,
            "k": self.k,
            "p": self.p,
            "rikaku": self.rikaku,
            "sonkiri": self.sonkiri,
            "up_threshold": self.up_threshold,
            "down_threshold": self.down_threshold,
            "indicators": [
                w.sma_short, w.sma_mid, w.sma_long, w.band_window,
                w.macd_short, w.macd_long, w.macd_signal, w.osc_window,
            ],
        });
        ConfigHash::from_bytes(canonical.to_string().as_bytes())
    }
}

/// Top-level trader configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraderConfig {
    /// Native units of exposure per signal lot.
    #[serde(default = "default_unit_size")]
    pub unit_size: f64,
    /// Orders smaller than this are suppressed. None places every non-zero delta.
    #[serde(default)]
    pub min_order_size: Option<f64>,
    /// Multiplier on the minimum warm-start history length when querying the store.
    #[serde(default = "default_history_margin")]
    pub history_margin: f64,
    /// Step engines on the rayon pool instead of sequentially.
    #[serde(default)]
    pub parallel_engines: bool,
    pub horizons: Vec<HorizonConfig>,
}

fn default_unit_size() -> f64 {
    0.001
}

fn default_history_margin() -> f64 {
    1.2
}

impl TraderConfig {
    pub fn new(horizons: Vec<HorizonConfig>) -> Self {
        Self {
            unit_size: default_unit_size(),
            min_order_size: None,
            history_margin: default_history_margin(),
            parallel_engines: false,
            horizons,
        }
    }

    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.unit_size > 0.0) || !self.unit_size.is_finite() {
            return Err(ConfigError::Invalid {
                field: "unit_size",
                reason: format!("must be a positive number (got {})", self.unit_size),
            });
        }
        if let Some(min) = self.min_order_size {
            if !(min > 0.0) || !min.is_finite() {
                return Err(ConfigError::Invalid {
                    field: "min_order_size",
                    reason: format!("must be a positive number (got {min})"),
                });
            }
        }
        if !(self.history_margin >= 1.0) || !self.history_margin.is_finite() {
            return Err(ConfigError::Invalid {
                field: "history_margin",
                reason: format!("must be >= 1.0 (got {})", self.history_margin),
            });
        }
        if self.horizons.is_empty() {
            return Err(ConfigError::NoHorizons);
        }

        let mut seen = HashSet::new();
        for horizon in &self.horizons {
            horizon.validate()?;
            if !seen.insert(horizon.name.as_str()) {
                return Err(ConfigError::DuplicateName(horizon.name.clone()));
            }
        }
        Ok(())
    }
}
