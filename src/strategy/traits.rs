// src/strategy/traits.rs

use rand::RngCore;
use std::fmt::Debug;

use crate::model::agent::Role;

/// What an AI-controlled entity sees when it decides on an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderContext {
    pub role: Role,
    /// Demand facing the entity this week.
    pub demand: u32,
    pub inventory: u32,
    pub backlog: u32,
    /// Weeks between dispatch and arrival of a shipment.
    pub lead_time: u32,
}

/// Defines the decision-making logic for a supply chain entity.
///
/// We require `Debug` so we can print the policy if needed.
/// `Send` + `Sync` keep the engine movable across threads.
pub trait OrderPolicy: Debug + Send + Sync {
    /// Calculates how much to order from the upstream supplier.
    ///
    /// Policies that need randomness draw it from `rng` so that a seeded
    /// game replays exactly.
    fn calculate_order(&self, context: &OrderContext, rng: &mut dyn RngCore) -> u32;
}
