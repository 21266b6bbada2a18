// src/simulation/snapshot.rs

use serde::Serialize;

use crate::io::demand::DemandPattern;
use crate::model::agent::{Entity, Role};
use crate::model::queues::Scheduled;
use crate::simulation::config::GameMode;
use crate::simulation::engine::Phase;
use crate::simulation::events::GameEvent;

/// Read-only copy of one entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityView {
    pub role: Role,
    pub inventory: u32,
    pub backlog: u32,
    pub incoming_demand: u32,
    pub last_order_placed: u32,
    pub last_shipment_received: u32,
    pub last_shipment_sent: u32,
    pub pending_shipments: Vec<Scheduled>,
    pub pending_demands: Vec<Scheduled>,
    pub outgoing_orders: Vec<Scheduled>,
    /// Units in transit towards this entity.
    pub supply_line: u32,
    pub weekly_cost: f64,
    pub total_cost: f64,
}

impl From<&Entity> for EntityView {
    fn from(entity: &Entity) -> Self {
        Self {
            role: entity.role,
            inventory: entity.inventory,
            backlog: entity.backlog,
            incoming_demand: entity.incoming_demand,
            last_order_placed: entity.last_order_placed,
            last_shipment_received: entity.last_shipment_received,
            last_shipment_sent: entity.last_shipment_sent,
            pending_shipments: entity.pending_shipments.entries().to_vec(),
            pending_demands: entity.pending_demands.entries().to_vec(),
            outgoing_orders: entity.outgoing_orders.clone(),
            supply_line: entity.supply_line(),
            weekly_cost: entity.last_cost,
            total_cost: entity.total_cost,
        }
    }
}

/// Deep copy of the simulation state handed to renderers, charts and reports.
/// Nothing in it aliases engine-owned containers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationStateView {
    pub phase: Phase,
    pub mode: Option<GameMode>,
    pub week: u32,
    pub total_weeks: u32,
    pub human_role: Option<Role>,
    pub demand_pattern: DemandPattern,
    /// Chain order, factory first.
    pub entities: Vec<EntityView>,
    pub incoming_order_for_human: u32,
    pub delivered_amount_last_week: u32,
    pub total_cost: f64,
    pub cost_history: Vec<f64>,
    pub inventory_history: Vec<u32>,
    pub backlog_history: Vec<u32>,
    pub order_history: Vec<u32>,
    pub demand_history: Vec<u32>,
    pub bullwhip_effect: f64,
    pub event_log: Vec<GameEvent>,
}

impl SimulationStateView {
    pub fn entity(&self, role: Role) -> Option<&EntityView> {
        self.entities.iter().find(|e| e.role == role)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntityStatus {
    pub role: Role,
    pub inventory: u32,
    pub backlog: u32,
}

/// What one `advance_week` call did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekSummary {
    /// The week the game moved into.
    pub week: u32,
    pub entities: Vec<EntityStatus>,
    /// Units the human seat shipped downstream.
    pub delivered: u32,
    /// The human seat's cost for the resolved week.
    pub cost_delta: f64,
    pub events: Vec<GameEvent>,
    pub bullwhip_effect: f64,
    pub completed: bool,
}

impl WeekSummary {
    pub fn entity(&self, role: Role) -> Option<&EntityStatus> {
        self.entities.iter().find(|e| e.role == role)
    }
}

/// One row per week per role, written to CSV by `io::reporting`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRecord {
    pub week: u32,
    pub role: Role,
    pub human: bool,
    pub inventory: u32,
    pub backlog: u32,
    pub incoming_demand: u32,
    pub order_placed: u32,
    pub shipment_sent: u32,
    pub shipment_received: u32,
    pub cost: f64,
}
