//! Horizon Core: per-horizon decision engines, signal aggregation, and
//! order reconciliation for a single-instrument trader.
//!
//! This crate contains:
//! - Domain types (sides, positions, transitions, price windows, order intents)
//! - Warm-start alignment of engine windows from recent history
//! - The per-horizon decision engine and its pure transition function
//! - Net-signal aggregation and target-vs-actual reconciliation
//! - Collaborator traits (exchange, history store, oracle) and in-memory
//!   implementations for replay and simulation
//! - The `Trader`, which runs one full tick end to end

pub mod collaborators;
pub mod config;
pub mod domain;
pub mod engine;
pub mod paper;
pub mod trader;

pub use collaborators::{
    Exchange, HistoricalPrice, HistoryError, HistoryStore, Oracle, OracleError, OrderError,
};
pub use config::{ConfigError, HorizonConfig, IndicatorWindows, TraderConfig};
pub use engine::{DecisionEngine, ExecutionReconciler, StepError, TickStatus};
pub use trader::{EngineTick, TickError, TickOutcome, TickReport, Trader, WarmStartReport};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: engines and their outputs can cross threads.
    ///
    /// `parallel_engines` steps engines on the rayon pool, so a non-Send
    /// field in any of these breaks the build here first.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Domain types
        require_send::<domain::Position>();
        require_sync::<domain::Position>();
        require_send::<domain::Transition>();
        require_sync::<domain::Transition>();
        require_send::<domain::PriceWindow>();
        require_sync::<domain::PriceWindow>();
        require_send::<domain::OrderIntent>();
        require_sync::<domain::OrderIntent>();
        require_send::<domain::ConfigHash>();
        require_sync::<domain::ConfigHash>();

        // Config
        require_send::<HorizonConfig>();
        require_sync::<HorizonConfig>();
        require_send::<TraderConfig>();
        require_sync::<TraderConfig>();

        // Engine types
        require_send::<DecisionEngine>();
        require_sync::<DecisionEngine>();
        require_send::<EngineTick>();
        require_send::<TickOutcome>();
        require_send::<Trader>();

        // Oracles are shared across the pool
        require_sync::<paper::MomentumOracle>();
        require_sync::<paper::RecordedOracle>();
    }

    /// Architecture contract: the oracle sees only the horizon config and the
    /// engine's own window, never positions or other engines.
    #[test]
    fn oracle_receives_horizon_config_and_window() {
        let oracle = |horizon: &HorizonConfig, window: &[f64]| -> Result<f64, OracleError> {
            if horizon.name == "h3" && window == [100.0, 101.0, 103.0] {
                Ok(0.9)
            } else {
                Err(OracleError::Prediction(format!("unexpected input {window:?}")))
            }
        };
        let dyn_oracle: &dyn Oracle = &oracle;

        let mut engine = DecisionEngine::new(HorizonConfig::new("h3", 3, 2)).unwrap();
        engine.tick(100.0, dyn_oracle).unwrap();
        engine.tick(101.0, dyn_oracle).unwrap();
        let status = engine.tick(103.0, dyn_oracle).unwrap();
        assert_eq!(
            status,
            TickStatus::Stepped(domain::Transition::Open {
                side: domain::Side::Long
            })
        );
    }
}
