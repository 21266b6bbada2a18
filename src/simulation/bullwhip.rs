// src/simulation/bullwhip.rs

/// Fewer samples than this and the ratio is reported as 0.
pub const MIN_SAMPLES: usize = 4;

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance (divides by N).
pub fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}

/// Variance of placed orders over variance of incoming demand.
///
/// `None` when the demand series is flat, since the ratio is undefined.
pub fn bullwhip_ratio(orders: &[f64], demand: &[f64]) -> Option<f64> {
    let demand_variance = variance(demand);
    if demand_variance > 0.0 {
        Some(variance(orders) / demand_variance)
    } else {
        None
    }
}

/// Tracks the bullwhip effect of the human seat.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BullwhipAnalyzer {
    pub effect: f64,
}

impl BullwhipAnalyzer {
    /// Recomputes the effect from paired order/demand histories.
    ///
    /// Below `MIN_SAMPLES` the effect is 0. A flat demand series leaves the
    /// previous value in place.
    pub fn update(&mut self, orders: &[u32], demand: &[u32]) -> f64 {
        let n = orders.len().min(demand.len());
        if n < MIN_SAMPLES {
            self.effect = 0.0;
            return self.effect;
        }

        // Align on the most recent n samples of each series
        let orders: Vec<f64> = orders[orders.len() - n..].iter().map(|&v| v as f64).collect();
        let demand: Vec<f64> = demand[demand.len() - n..].iter().map(|&v| v as f64).collect();

        if let Some(ratio) = bullwhip_ratio(&orders, &demand) {
            self.effect = ratio;
        }
        self.effect
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn population_variance() {
        assert_eq!(variance(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]), 4.0);
        assert_eq!(variance(&[]), 0.0);
    }

    #[test]
    fn flat_demand_leaves_zero() {
        let mut analyzer = BullwhipAnalyzer::default();
        assert_eq!(analyzer.update(&[4, 4, 4, 4], &[4, 4, 4, 4]), 0.0);
        assert!(analyzer.effect.is_finite());
    }

    #[test]
    fn flat_demand_keeps_previous_value() {
        let mut analyzer = BullwhipAnalyzer { effect: 2.5 };
        assert_eq!(analyzer.update(&[1, 9, 1, 9], &[4, 4, 4, 4]), 2.5);
    }

    #[test]
    fn needs_four_samples() {
        let mut analyzer = BullwhipAnalyzer { effect: 3.0 };
        assert_eq!(analyzer.update(&[1, 9, 1], &[4, 8, 4]), 0.0);
    }

    #[test]
    fn amplified_orders() {
        let mut analyzer = BullwhipAnalyzer::default();
        // orders swing twice as wide as demand: variance ratio 4
        let effect = analyzer.update(&[2, 10, 2, 10], &[4, 8, 4, 8]);
        assert!((effect - 4.0).abs() < 1e-12);
    }
}
