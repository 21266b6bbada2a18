// src/simulation/router.rs

use crate::model::agent::{Role, SupplyChain};
use crate::model::queues::Scheduled;

/// Where a placed order will show up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutedOrder {
    /// Week the upstream neighbor sees the order as demand.
    pub due_week: u32,
    /// Week production lands in the factory's stock. `None` for roles whose
    /// goods come from an upstream entity's fulfillment instead.
    pub production_arrival: Option<u32>,
}

/// Moves orders upstream and shipments downstream under the configured delays.
///
/// Orders flow UPSTREAM (retailer -> wholesaler -> distributor -> factory)
/// after the information delay. Shipments flow DOWNSTREAM after the shipping
/// delay. The factory orders from production, which always delivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderRouter {
    pub information_delay: u32,
    pub shipping_delay: u32,
}

impl OrderRouter {
    pub fn new(information_delay: u32, shipping_delay: u32) -> Self {
        Self {
            information_delay,
            shipping_delay,
        }
    }

    /// Lead time of a production run, from order to stock.
    pub fn production_lead_time(&self) -> u32 {
        self.information_delay.saturating_add(self.shipping_delay)
    }

    /// Routes an order of `amount` placed by `role` in `week`.
    ///
    /// Only the factory schedules its own arrival (production). Every other
    /// role gets its goods from the supplier's `ship_downstream`, so the units
    /// are counted once.
    pub fn place_order(
        &self,
        chain: &mut SupplyChain,
        role: Role,
        amount: u32,
        week: u32,
    ) -> RoutedOrder {
        let due_week = week.saturating_add(self.information_delay);

        // 1. Record the outgoing order
        let entity = chain.get_mut(role);
        entity.last_order_placed = amount;
        entity.outgoing_orders.push(Scheduled {
            week: due_week,
            amount,
        });

        // 2. The order becomes future demand for the supplier
        // 3. ...or, for the factory, a production run into its own stock
        let production_arrival = match role.upstream() {
            Some(upstream) => {
                chain
                    .get_mut(upstream)
                    .pending_demands
                    .schedule(due_week, amount);
                None
            }
            None => {
                let arrival = due_week.saturating_add(self.shipping_delay);
                chain
                    .get_mut(role)
                    .pending_shipments
                    .schedule(arrival, amount);
                Some(arrival)
            }
        };

        RoutedOrder {
            due_week,
            production_arrival,
        }
    }

    /// Credits every shipment arriving at `role` in `week`. Idempotent per week.
    pub fn deliver_shipment(&self, chain: &mut SupplyChain, role: Role, week: u32) -> u32 {
        chain.get_mut(role).receive_shipments(week)
    }

    /// Sends `delivered` units from `role` to its customer, fulfilled in `week`.
    ///
    /// Returns the arrival week, or `None` when the retailer sold to consumers.
    pub fn ship_downstream(
        &self,
        chain: &mut SupplyChain,
        role: Role,
        delivered: u32,
        week: u32,
    ) -> Option<u32> {
        let downstream = role.downstream()?;
        let arrival = week.saturating_add(self.shipping_delay);
        if delivered > 0 {
            chain
                .get_mut(downstream)
                .pending_shipments
                .schedule(arrival, delivered);
        }
        Some(arrival)
    }
}
