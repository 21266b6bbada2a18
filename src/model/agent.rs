use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::model::queues::{Scheduled, ScheduledQueue};
use crate::simulation::error::ConfigError;

/// The four links of the chain, ordered from the top (factory) to the
/// consumer-facing end (retailer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Factory,
    Distributor,
    Wholesaler,
    Retailer,
}

impl Role {
    /// Chain order: factory first, retailer last.
    pub const ALL: [Role; 4] = [
        Role::Factory,
        Role::Distributor,
        Role::Wholesaler,
        Role::Retailer,
    ];

    /// Position in the chain (factory = 0, retailer = 3).
    pub fn index(self) -> usize {
        match self {
            Role::Factory => 0,
            Role::Distributor => 1,
            Role::Wholesaler => 2,
            Role::Retailer => 3,
        }
    }

    /// The supplier of this role. The factory is supplied by production.
    pub fn upstream(self) -> Option<Role> {
        match self {
            Role::Factory => None,
            Role::Distributor => Some(Role::Factory),
            Role::Wholesaler => Some(Role::Distributor),
            Role::Retailer => Some(Role::Wholesaler),
        }
    }

    /// The customer of this role. The retailer sells to consumers.
    pub fn downstream(self) -> Option<Role> {
        match self {
            Role::Factory => Some(Role::Distributor),
            Role::Distributor => Some(Role::Wholesaler),
            Role::Wholesaler => Some(Role::Retailer),
            Role::Retailer => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Factory => "factory",
            Role::Distributor => "distributor",
            Role::Wholesaler => "wholesaler",
            Role::Retailer => "retailer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "factory" => Ok(Role::Factory),
            "distributor" => Ok(Role::Distributor),
            "wholesaler" => Ok(Role::Wholesaler),
            "retailer" => Ok(Role::Retailer),
            _ => Err(ConfigError::UnknownRole(s.to_string())),
        }
    }
}

/// How a fulfillment step went.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FulfillmentOutcome {
    /// Demand and backlog shipped in full.
    Full,
    /// Shipped everything on hand, the rest is backlogged.
    Partial,
    /// Nothing on hand, the whole demand is backlogged.
    Stockout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fulfillment {
    pub delivered: u32,
    pub outcome: FulfillmentOutcome,
}

/// The state of a single node in the supply chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    // Identity
    pub role: Role,

    // State Variables
    pub inventory: u32,
    pub backlog: u32,
    pub pending_shipments: ScheduledQueue, // Goods in transit to this entity
    pub pending_demands: ScheduledQueue,   // Orders from downstream not yet seen
    pub outgoing_orders: Vec<Scheduled>,   // Orders sent upstream, keyed by due week

    // Tracking for Analysis/Logging
    pub incoming_demand: u32,        // Demand facing this entity this week
    pub last_shipment_received: u32, // Goods from upstream
    pub last_order_placed: u32,      // Decision made by this entity
    pub last_shipment_sent: u32,     // Goods sent downstream
    pub last_cost: f64,
    pub total_cost: f64,
}

impl Entity {
    pub fn new(role: Role, initial_inventory: u32) -> Self {
        Self {
            role,
            inventory: initial_inventory,
            backlog: 0,
            pending_shipments: ScheduledQueue::new(),
            pending_demands: ScheduledQueue::new(),
            outgoing_orders: Vec::new(),
            incoming_demand: 0,
            last_shipment_received: 0,
            last_order_placed: 0,
            last_shipment_sent: 0,
            last_cost: 0.0,
            total_cost: 0.0,
        }
    }

    /// Step 1: Receive every shipment arriving in `week`.
    ///
    /// Returns the quantity received. Calling it twice for the same week
    /// credits inventory only once.
    pub fn receive_shipments(&mut self, week: u32) -> u32 {
        let quantity = self.pending_shipments.drain_week(week);
        self.inventory = self.inventory.saturating_add(quantity);
        self.last_shipment_received = quantity;
        quantity
    }

    /// Step 2: Ship against this week's demand plus the backlog.
    pub fn fulfill(&mut self, demand: u32) -> Fulfillment {
        // Total obligation = New Order + Old Backlog
        let total_demand = demand.saturating_add(self.backlog);

        let fulfillment = if self.inventory >= total_demand {
            self.inventory -= total_demand;
            self.backlog = 0;
            Fulfillment {
                delivered: total_demand,
                outcome: FulfillmentOutcome::Full,
            }
        } else if self.inventory > 0 {
            // Short: ship what we have, backlog the rest.
            let delivered = self.inventory;
            self.backlog = total_demand - delivered;
            self.inventory = 0;
            Fulfillment {
                delivered,
                outcome: FulfillmentOutcome::Partial,
            }
        } else {
            self.backlog = total_demand;
            Fulfillment {
                delivered: 0,
                outcome: FulfillmentOutcome::Stockout,
            }
        };

        self.last_shipment_sent = fulfillment.delivered;
        fulfillment
    }

    /// Goods ordered but not yet arrived.
    pub fn supply_line(&self) -> u32 {
        self.pending_shipments.total()
    }
}

/// The four entities, indexed by role.
#[derive(Debug, Clone, PartialEq)]
pub struct SupplyChain {
    entities: [Entity; 4],
}

impl SupplyChain {
    pub fn new(initial_inventory: u32) -> Self {
        Self {
            entities: Role::ALL.map(|role| Entity::new(role, initial_inventory)),
        }
    }

    pub fn get(&self, role: Role) -> &Entity {
        &self.entities[role.index()]
    }

    pub fn get_mut(&mut self, role: Role) -> &mut Entity {
        &mut self.entities[role.index()]
    }

    /// Entities in chain order, factory first.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacency_is_a_total_order() {
        assert_eq!(Role::Retailer.upstream(), Some(Role::Wholesaler));
        assert_eq!(Role::Factory.upstream(), None);
        assert_eq!(Role::Retailer.downstream(), None);
        assert_eq!(Role::Factory.downstream(), Some(Role::Distributor));
        for role in Role::ALL {
            if let Some(up) = role.upstream() {
                assert_eq!(up.downstream(), Some(role));
                assert!(up.index() < role.index());
            }
        }
    }

    #[test]
    fn parse_role_names() {
        assert_eq!("Retailer".parse::<Role>().ok(), Some(Role::Retailer));
        assert!(matches!(
            "brewery".parse::<Role>(),
            Err(ConfigError::UnknownRole(name)) if name == "brewery"
        ));
    }

    #[test]
    fn full_fulfillment_clears_backlog() {
        let mut e = Entity::new(Role::Wholesaler, 20);
        e.backlog = 3;
        let f = e.fulfill(5);
        assert_eq!(f.delivered, 8);
        assert_eq!(f.outcome, FulfillmentOutcome::Full);
        assert_eq!(e.inventory, 12);
        assert_eq!(e.backlog, 0);
    }

    #[test]
    fn full_fulfillment_conserves_units() {
        for inventory in 0..15u32 {
            for backlog in 0..6u32 {
                for demand in 0..8u32 {
                    if inventory < demand + backlog {
                        continue;
                    }
                    let mut e = Entity::new(Role::Retailer, inventory);
                    e.backlog = backlog;
                    e.fulfill(demand);
                    assert_eq!(e.backlog, 0);
                    assert_eq!(e.inventory, inventory - demand - backlog);
                }
            }
        }
    }

    #[test]
    fn partial_fulfillment_ships_everything_on_hand() {
        let mut e = Entity::new(Role::Retailer, 5);
        e.backlog = 2;
        let f = e.fulfill(6);
        assert_eq!(f.delivered, 5);
        assert_eq!(f.outcome, FulfillmentOutcome::Partial);
        assert_eq!(e.inventory, 0);
        assert_eq!(e.backlog, 3);
    }

    #[test]
    fn stockout_accumulates_backlog() {
        let mut e = Entity::new(Role::Factory, 0);
        e.backlog = 4;
        let f = e.fulfill(7);
        assert_eq!(f.delivered, 0);
        assert_eq!(f.outcome, FulfillmentOutcome::Stockout);
        assert_eq!(e.backlog, 11);
    }

    #[test]
    fn shipments_are_credited_once() {
        let mut e = Entity::new(Role::Distributor, 12);
        e.pending_shipments.schedule(3, 4);
        e.pending_shipments.schedule(3, 2);
        assert_eq!(e.receive_shipments(3), 6);
        assert_eq!(e.receive_shipments(3), 0);
        assert_eq!(e.inventory, 18);
    }
}
