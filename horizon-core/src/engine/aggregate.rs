//! Signal aggregation: a pure fold over independent engines.

use crate::engine::decision::DecisionEngine;

/// Net signal across all engines, in lots.
pub fn aggregate<'a, I>(engines: I) -> i64
where
    I: IntoIterator<Item = &'a DecisionEngine>,
{
    engines.into_iter().map(|e| i64::from(e.signal())).sum()
}

/// Target exposure in native units for a net lot count.
pub fn target_exposure(net_lots: i64, unit_size: f64) -> f64 {
    net_lots as f64 * unit_size
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HorizonConfig;

    fn engine_with_signal(name: &str, p_up: f64) -> DecisionEngine {
        let mut e = DecisionEngine::new(HorizonConfig::new(name, 3, 5)).unwrap();
        e.step(100.0, 1.0, p_up).unwrap();
        e
    }

    #[test]
    fn sums_signals() {
        let engines = vec![
            engine_with_signal("a", 0.9),
            engine_with_signal("b", 0.8),
            engine_with_signal("c", 0.1),
        ];
        assert_eq!(aggregate(&engines), 1);
        assert_eq!(aggregate(engines.iter().rev()), 1);
    }

    #[test]
    fn flat_engines_contribute_nothing() {
        let engines = vec![
            DecisionEngine::new(HorizonConfig::new("a", 3, 5)).unwrap(),
            engine_with_signal("b", 0.9),
        ];
        assert_eq!(aggregate(&engines), 1);
        assert_eq!(aggregate(std::iter::empty()), 0);
    }

    #[test]
    fn scales_by_unit_size() {
        assert_eq!(target_exposure(3, 0.5), 1.5);
        assert_eq!(target_exposure(-2, 0.25), -0.5);
        assert_eq!(target_exposure(0, 0.001), 0.0);
    }
}
