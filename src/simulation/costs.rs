// src/simulation/costs.rs

use crate::model::agent::Entity;
use crate::simulation::config::CostRates;

/// Holding plus backlog cost of one entity for one week.
pub fn weekly_cost(entity: &Entity, rates: &CostRates) -> f64 {
    (entity.inventory as f64 * rates.inventory) + (entity.backlog as f64 * rates.backlog)
}

/// Accumulates weekly costs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CostAccountant {
    pub total: f64,
    pub history: Vec<f64>,
}

impl CostAccountant {
    pub fn new() -> Self {
        Self::default()
    }

    /// Books this week's cost and returns it.
    pub fn record(&mut self, cost: f64) -> f64 {
        self.total += cost;
        self.history.push(cost);
        cost
    }
}
