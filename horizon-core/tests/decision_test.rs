//! Integration tests for a single decision engine driven tick by tick.
//!
//! Tests:
//! 1. Warm-up then open, hold, and renew on a short horizon
//! 2. Expiry with no prediction drops the signal on the same tick
//! 3. An engine with no predictions never leaves flat
//! 4. Identical inputs give identical trajectories

use horizon_core::collaborators::{Oracle, OracleError};
use horizon_core::config::HorizonConfig;
use horizon_core::domain::{ExitReason, Position, Side, Transition};
use horizon_core::engine::{DecisionEngine, TickStatus};
use horizon_core::paper::{MomentumOracle, RandomWalk};

/// Oracle that replays one probability per call.
fn scripted(probabilities: Vec<f64>) -> impl Oracle {
    let cursor = std::sync::atomic::AtomicUsize::new(0);
    move |_: &HorizonConfig, _: &[f64]| -> Result<f64, OracleError> {
        let i = cursor.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        probabilities
            .get(i)
            .copied()
            .ok_or_else(|| OracleError::Prediction("script exhausted".into()))
    }
}

fn population_std(xs: &[f64]) -> f64 {
    let n = xs.len() as f64;
    let mean = xs.iter().sum::<f64>() / n;
    (xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n).sqrt()
}

// ──────────────────────────────────────────────
// Lifecycle
// ──────────────────────────────────────────────

#[test]
fn opens_holds_and_renews() {
    let mut engine = DecisionEngine::new(HorizonConfig::new("k3", 3, 2)).unwrap();
    let oracle = scripted(vec![0.9, 0.6, 0.6]);

    assert!(matches!(
        engine.tick(100.0, &oracle).unwrap(),
        TickStatus::Warming { have: 1, need: 3 }
    ));
    assert!(matches!(
        engine.tick(101.0, &oracle).unwrap(),
        TickStatus::Warming { have: 2, need: 3 }
    ));

    // Window full: open long at 103.
    assert_eq!(
        engine.tick(103.0, &oracle).unwrap(),
        TickStatus::Stepped(Transition::Open { side: Side::Long })
    );
    let entry_vol = population_std(&[100.0, 101.0, 103.0]);
    assert_eq!(
        *engine.position(),
        Position::Holding {
            side: Side::Long,
            remaining_ticks: 2,
            entry_price: 103.0,
            entry_volatility: entry_vol,
        }
    );
    assert_eq!(engine.signal(), 1);

    // risk = 1 / 1.247 < 2: hold, one tick left.
    match engine.tick(104.0, &oracle).unwrap() {
        TickStatus::Stepped(Transition::Hold {
            remaining_ticks,
            risk,
        }) => {
            assert_eq!(remaining_ticks, 1);
            assert!((risk - 1.0 / entry_vol).abs() < 1e-12);
        }
        other => panic!("expected hold, got {other:?}"),
    }
    assert_eq!(engine.signal(), 1);

    // Counter hits zero, still predicted long: renew at 106.
    match engine.tick(106.0, &oracle).unwrap() {
        TickStatus::Stepped(Transition::Renew { side, reason, .. }) => {
            assert_eq!(side, Side::Long);
            assert_eq!(reason, ExitReason::Expired);
        }
        other => panic!("expected renew, got {other:?}"),
    }
    assert_eq!(
        *engine.position(),
        Position::Holding {
            side: Side::Long,
            remaining_ticks: 2,
            entry_price: 106.0,
            entry_volatility: population_std(&[103.0, 104.0, 106.0]),
        }
    );
    assert_eq!(engine.signal(), 1);
}

#[test]
fn expiry_without_prediction_zeroes_signal_same_tick() {
    let cfg = HorizonConfig::new("k1", 1, 2).with_thresholds(0.6, 0.4);
    let mut engine = DecisionEngine::new(cfg).unwrap();
    let oracle = scripted(vec![0.9, 0.5, 0.5]);

    engine.tick(100.0, &oracle).unwrap();
    assert_eq!(engine.signal(), 1);

    engine.tick(100.0, &oracle).unwrap();
    assert_eq!(engine.signal(), 1);

    let status = engine.tick(100.0, &oracle).unwrap();
    assert!(matches!(
        status,
        TickStatus::Stepped(Transition::Close {
            side: Side::Long,
            reason: ExitReason::Expired,
            ..
        })
    ));
    assert!(engine.position().is_flat());
    assert_eq!(engine.signal(), 0);
}

#[test]
fn stop_loss_flips_short() {
    let mut engine = DecisionEngine::new(HorizonConfig::new("k2", 2, 10)).unwrap();
    let oracle = scripted(vec![0.9, 0.1]);

    engine.tick(100.0, &oracle).unwrap();
    engine.tick(102.0, &oracle).unwrap(); // open long, entry vol 1.0
    let status = engine.tick(100.5, &oracle).unwrap(); // risk -1.5
    assert!(matches!(
        status,
        TickStatus::Stepped(Transition::Flip {
            from: Side::Long,
            to: Side::Short,
            reason: ExitReason::StopLoss,
            ..
        })
    ));
    assert_eq!(engine.signal(), -1);
}

#[test]
fn neutral_predictions_stay_flat() {
    let cfg = HorizonConfig::new("neutral", 3, 5).with_thresholds(0.6, 0.4);
    let mut engine = DecisionEngine::new(cfg).unwrap();
    let oracle = |_: &HorizonConfig, _: &[f64]| -> Result<f64, OracleError> { Ok(0.5) };

    for price in RandomWalk::new(11, 100.0, 0.02).take(50) {
        engine.tick(price, &oracle).unwrap();
        assert!(engine.position().is_flat());
        assert_eq!(engine.signal(), 0);
    }
}

// ──────────────────────────────────────────────
// Determinism
// ──────────────────────────────────────────────

fn trajectory(seed: u64) -> String {
    let mut engine = DecisionEngine::new(HorizonConfig::new("det", 10, 4)).unwrap();
    let oracle = MomentumOracle::new(1.5);
    let steps: Vec<(TickStatus, Position)> = RandomWalk::new(seed, 100.0, 0.01)
        .take(300)
        .map(|price| {
            let status = engine.tick(price, &oracle).unwrap();
            (status, *engine.position())
        })
        .collect();
    serde_json::to_string(&steps).unwrap()
}

#[test]
fn identical_inputs_identical_trajectories() {
    let first = trajectory(5);
    assert!(first.contains("entry_volatility"));
    assert_eq!(first, trajectory(5));
    assert_ne!(trajectory(5), trajectory(6));
}
