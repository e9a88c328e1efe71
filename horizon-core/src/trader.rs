//! Trader: owns the engine collection and runs one tick end to end.
//!
//! A tick is: read price → every engine decides → aggregate → read held
//! exposure → reconcile → place at most one order. Per-engine failures are
//! recorded in the outcome and never stop the other engines or the order
//! stage. Only exchange failures escape a tick.
//!
//! `run_tick` takes `&mut self`, so at most one tick is in flight per trader.

use crate::collaborators::{Exchange, HistoryError, HistoryStore, Oracle, OrderError};
use crate::config::{ConfigError, TraderConfig};
use crate::domain::OrderIntent;
use crate::engine::{
    aggregate, fetch_length, required_history, target_exposure, AlignError, DecisionEngine,
    ExecutionReconciler, HistoryQuality, StepError, TickStatus,
};
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Exchange failures that abort a tick.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TickError {
    #[error("read price: {0}")]
    Price(OrderError),

    #[error("read position: {0}")]
    Position(OrderError),

    #[error("place order: {0}")]
    Order(OrderError),
}

/// One engine's result for a tick.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineTick {
    pub horizon: String,
    pub status: Result<TickStatus, StepError>,
    /// Signal after the tick (unchanged from before on error).
    pub signal: i32,
}

/// Decision stage output for one price.
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    pub tick: u64,
    pub price: f64,
    pub engines: Vec<EngineTick>,
    pub net_lots: i64,
    pub target_exposure: f64,
}

impl TickOutcome {
    pub fn errors(&self) -> impl Iterator<Item = (&str, &StepError)> {
        self.engines
            .iter()
            .filter_map(|e| e.status.as_ref().err().map(|err| (e.horizon.as_str(), err)))
    }
}

/// Full tick output including the order stage.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub outcome: TickOutcome,
    pub actual_exposure: f64,
    pub order: Option<OrderIntent>,
}

/// Per-engine warm-start results.
#[derive(Debug, Clone, PartialEq)]
pub struct WarmStartReport {
    pub requested: usize,
    pub received: usize,
    pub quality: Option<HistoryQuality>,
    pub store_error: Option<HistoryError>,
    pub engines: Vec<(String, Result<(), AlignError>)>,
}

impl WarmStartReport {
    pub fn warmed(&self) -> usize {
        self.engines.iter().filter(|(_, r)| r.is_ok()).count()
    }
}

pub struct Trader {
    config: TraderConfig,
    engines: Vec<DecisionEngine>,
    reconciler: ExecutionReconciler,
    ticks: u64,
}

impl Trader {
    pub fn new(config: TraderConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let engines = config
            .horizons
            .iter()
            .cloned()
            .map(DecisionEngine::new)
            .collect::<Result<Vec<_>, _>>()?;
        let reconciler =
            ExecutionReconciler::new(config.unit_size).with_min_order_size(config.min_order_size);

        for engine in &engines {
            info!(
                horizon = engine.name(),
                k = engine.config().k,
                p = engine.config().p,
                fingerprint = engine.fingerprint().short(),
                "engine configured"
            );
        }

        Ok(Self {
            config,
            engines,
            reconciler,
            ticks: 0,
        })
    }

    pub fn config(&self) -> &TraderConfig {
        &self.config
    }

    pub fn engines(&self) -> &[DecisionEngine] {
        &self.engines
    }

    pub fn engine(&self, name: &str) -> Option<&DecisionEngine> {
        self.engines.iter().find(|e| e.name() == name)
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn net_lots(&self) -> i64 {
        aggregate(&self.engines)
    }

    /// Load every engine window from one history query.
    ///
    /// Never fails: a store error or a short history leaves the affected
    /// engines cold, and they warm up from live ticks instead.
    pub fn warm_start(&mut self, store: &dyn HistoryStore) -> WarmStartReport {
        let requested = fetch_length(&self.config.horizons, self.config.history_margin);
        info!(requested, horizons = self.engines.len(), "fetching warm-start history");

        let history = match store.history(requested) {
            Ok(samples) => samples,
            Err(err) => {
                warn!(error = %err, "history store failed, engines start cold");
                return WarmStartReport {
                    requested,
                    received: 0,
                    quality: None,
                    store_error: Some(err),
                    engines: self
                        .engines
                        .iter()
                        .map(|e| {
                            (
                                e.name().to_string(),
                                Err(AlignError::InsufficientHistory {
                                    required: required_history(e.config()),
                                    available: 0,
                                }),
                            )
                        })
                        .collect(),
                };
            }
        };

        let prices: Vec<f64> = history.iter().map(|h| h.price).collect();
        let quality = HistoryQuality::assess(&prices, requested);
        for issue in &quality.issues {
            warn!(issue = issue.as_str(), "history quality");
        }

        let engines = self
            .engines
            .iter_mut()
            .map(|engine| {
                let result = engine.warm_start(&prices);
                if let Err(err) = &result {
                    warn!(horizon = engine.name(), error = %err, "warm-start skipped");
                }
                (engine.name().to_string(), result)
            })
            .collect();

        WarmStartReport {
            requested,
            received: prices.len(),
            quality: Some(quality),
            store_error: None,
            engines,
        }
    }

    /// Run the decision and aggregation stages for one price.
    pub fn on_price(&mut self, price: f64, oracle: &dyn Oracle) -> TickOutcome {
        self.ticks += 1;

        let step = |engine: &mut DecisionEngine| {
            let status = engine.tick(price, oracle);
            if let Err(err) = &status {
                warn!(horizon = engine.name(), error = %err, "engine tick skipped");
            }
            EngineTick {
                horizon: engine.name().to_string(),
                status,
                signal: engine.signal(),
            }
        };

        let engines: Vec<EngineTick> = if self.config.parallel_engines {
            self.engines.par_iter_mut().map(step).collect()
        } else {
            self.engines.iter_mut().map(step).collect()
        };

        let net_lots = aggregate(&self.engines);
        let target = target_exposure(net_lots, self.config.unit_size);
        debug!(tick = self.ticks, price, net_lots, target, "aggregated");

        TickOutcome {
            tick: self.ticks,
            price,
            engines,
            net_lots,
            target_exposure: target,
        }
    }

    /// Run one full tick against the exchange.
    ///
    /// The caller is responsible for `cancel_all` before the tick and for
    /// pacing ticks.
    pub fn run_tick(
        &mut self,
        exchange: &mut dyn Exchange,
        oracle: &dyn Oracle,
    ) -> Result<TickReport, TickError> {
        let price = exchange.price().map_err(TickError::Price)?;
        let outcome = self.on_price(price, oracle);

        let actual_exposure = exchange.position().map_err(TickError::Position)?;
        let actual_lots = self.reconciler.lots_from_exposure(actual_exposure);
        let order = self
            .reconciler
            .reconcile(outcome.net_lots as f64, actual_lots);

        if let Some(intent) = &order {
            info!(
                tick = outcome.tick,
                order = %intent,
                net_lots = outcome.net_lots,
                actual_lots,
                "placing order"
            );
            exchange.place_order(intent).map_err(TickError::Order)?;
        }

        Ok(TickReport {
            outcome,
            actual_exposure,
            order,
        })
    }
}
