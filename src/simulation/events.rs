// src/simulation/events.rs

use rand::Rng;
use rand_distr::{Bernoulli, Distribution, Uniform};
use serde::Serialize;
use std::collections::VecDeque;

use crate::io::demand::DemandSettings;
use crate::model::agent::{Role, SupplyChain};

/// Oldest entries are evicted past this many.
pub const EVENT_LOG_CAPACITY: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    OrderPlaced,
    ShipmentReceived,
    OrderFulfilled,
    Shortage,
    Stockout,
    WeeklyCost,
    DemandStep,
    ShipmentDelayed,
    DemandSpike,
    QualityLoss,
    Surplus,
    GameCompleted,
}

/// A structured record of something that happened. How (and whether) it is
/// shown is up to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameEvent {
    pub week: u32,
    pub kind: EventKind,
    pub severity: Severity,
    pub message: String,
}

impl GameEvent {
    pub fn new(week: u32, kind: EventKind, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            week,
            kind,
            severity,
            message: message.into(),
        }
    }
}

/// Bounded, ordered event history.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventLog {
    entries: VecDeque<GameEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: GameEvent) {
        if self.entries.len() == EVENT_LOG_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(event);
    }

    pub fn extend(&mut self, events: impl IntoIterator<Item = GameEvent>) {
        for event in events {
            self.push(event);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.entries.iter()
    }

    pub fn to_vec(&self) -> Vec<GameEvent> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Perturbs one entity's shipments, demand or stock with a fixed weekly chance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RandomEventInjector {
    pub probability: f64,
}

impl RandomEventInjector {
    pub fn new(probability: f64) -> Self {
        Self { probability }
    }

    /// Rolls for this week's event against `role`. At most one effect fires,
    /// and each effect yields exactly one event.
    pub fn inject<R: Rng + ?Sized>(
        &self,
        chain: &mut SupplyChain,
        role: Role,
        week: u32,
        demand: &DemandSettings,
        rng: &mut R,
    ) -> Option<GameEvent> {
        let fires = Bernoulli::new(self.probability)
            .map(|b| b.sample(rng))
            .unwrap_or(false);
        if !fires {
            return None;
        }

        let roll: f64 = Uniform::new(0.0, 1.0).sample(rng);
        let event = match effect_for(roll) {
            EventKind::ShipmentDelayed => delay_shipment(chain, role, week, rng),
            EventKind::DemandSpike => demand_spike(chain, role, week, demand, rng),
            EventKind::QualityLoss => quality_loss(chain, role, week, rng),
            _ => surplus(chain, role, week, rng),
        };
        Some(event)
    }
}

/// Maps a roll in [0, 1) onto four equal buckets: delay, spike, quality loss,
/// surplus.
pub fn effect_for(roll: f64) -> EventKind {
    if roll < 0.25 {
        EventKind::ShipmentDelayed
    } else if roll < 0.5 {
        EventKind::DemandSpike
    } else if roll < 0.75 {
        EventKind::QualityLoss
    } else {
        EventKind::Surplus
    }
}

/// Pushes one in-transit shipment back by 1-2 weeks.
pub fn delay_shipment<R: Rng + ?Sized>(
    chain: &mut SupplyChain,
    role: Role,
    week: u32,
    rng: &mut R,
) -> GameEvent {
    let shipments = &mut chain.get_mut(role).pending_shipments;
    if shipments.is_empty() {
        return GameEvent::new(
            week,
            EventKind::ShipmentDelayed,
            Severity::Warning,
            "Transport problem: carriers are running late, but nothing was in transit",
        );
    }

    let index = Uniform::new(0, shipments.len()).sample(rng);
    let delay: u32 = Uniform::new_inclusive(1, 2).sample(rng);
    let amount = shipments.entries()[index].amount;
    let arrival = shipments.delay_entry(index, delay).unwrap_or(week + delay);

    GameEvent::new(
        week,
        EventKind::ShipmentDelayed,
        Severity::Warning,
        format!(
            "Transport problem: a shipment of {amount} units is delayed by {delay} week(s), now due in week {arrival}"
        ),
    )
}

/// Raises next week's demand on `role`, either by topping up the scheduled
/// entry or by adding a fresh urgent order.
pub fn demand_spike<R: Rng + ?Sized>(
    chain: &mut SupplyChain,
    role: Role,
    week: u32,
    demand: &DemandSettings,
    rng: &mut R,
) -> GameEvent {
    let next_week = week.saturating_add(1);
    let demands = &mut chain.get_mut(role).pending_demands;

    let extra = match demands.entry_for_week_mut(next_week) {
        Some(entry) => {
            let share: f64 = Uniform::new_inclusive(0.5, 1.0).sample(rng);
            let increase = (entry.amount as f64 * share).ceil() as u32;
            entry.amount = entry.amount.saturating_add(increase);
            increase
        }
        None => {
            let base = if week < demand.step_week {
                demand.base
            } else {
                demand.step
            };
            let share: f64 = Uniform::new(0.0, 1.0).sample(rng);
            let urgent = base.saturating_add((share * base as f64).ceil() as u32);
            demands.schedule(next_week, urgent);
            urgent
        }
    };

    GameEvent::new(
        week,
        EventKind::DemandSpike,
        Severity::Warning,
        format!("Urgent order: demand rises by {extra} units next week"),
    )
}

/// Writes off 10-30% of the stock (rounded up).
pub fn quality_loss<R: Rng + ?Sized>(
    chain: &mut SupplyChain,
    role: Role,
    week: u32,
    rng: &mut R,
) -> GameEvent {
    let entity = chain.get_mut(role);
    let share: f64 = Uniform::new(0.1, 0.3).sample(rng);
    let loss = (entity.inventory as f64 * share).ceil() as u32;
    entity.inventory = entity.inventory.saturating_sub(loss);

    GameEvent::new(
        week,
        EventKind::QualityLoss,
        Severity::Error,
        format!("Quality problem: {loss} units pulled from stock"),
    )
}

/// Finds 10-20% extra stock (rounded up) plus one unit.
pub fn surplus<R: Rng + ?Sized>(
    chain: &mut SupplyChain,
    role: Role,
    week: u32,
    rng: &mut R,
) -> GameEvent {
    let entity = chain.get_mut(role);
    let share: f64 = Uniform::new(0.1, 0.2).sample(rng);
    let found = (entity.inventory as f64 * share).ceil() as u32 + 1;
    entity.inventory = entity.inventory.saturating_add(found);

    GameEvent::new(
        week,
        EventKind::Surplus,
        Severity::Success,
        format!("Surprise: {found} unexpected units found in the warehouse"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn event(week: u32) -> GameEvent {
        GameEvent::new(week, EventKind::WeeklyCost, Severity::Info, "cost")
    }

    #[test]
    fn log_evicts_oldest_first() {
        let mut log = EventLog::new();
        for week in 0..60 {
            log.push(event(week));
        }
        assert_eq!(log.len(), EVENT_LOG_CAPACITY);
        assert_eq!(log.iter().next().map(|e| e.week), Some(10));
        assert_eq!(log.iter().last().map(|e| e.week), Some(59));
    }

    #[test]
    fn zero_probability_never_fires() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let mut chain = SupplyChain::new(12);
        let injector = RandomEventInjector::new(0.0);
        let settings = DemandSettings::default();
        for week in 1..200 {
            assert!(injector
                .inject(&mut chain, Role::Retailer, week, &settings, &mut rng)
                .is_none());
        }
        assert_eq!(chain, SupplyChain::new(12));
    }

    #[test]
    fn certain_probability_always_fires_one_event() {
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let mut chain = SupplyChain::new(12);
        let injector = RandomEventInjector::new(1.0);
        let settings = DemandSettings::default();
        for week in 1..100 {
            chain.get_mut(Role::Wholesaler).pending_shipments.schedule(week + 2, 4);
            let e = injector.inject(&mut chain, Role::Wholesaler, week, &settings, &mut rng);
            assert!(e.is_some());
        }
    }

    #[test]
    fn delay_moves_a_shipment_later() {
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let mut chain = SupplyChain::new(12);
        chain.get_mut(Role::Retailer).pending_shipments.schedule(4, 5);
        let e = delay_shipment(&mut chain, Role::Retailer, 2, &mut rng);
        assert_eq!(e.kind, EventKind::ShipmentDelayed);
        assert_eq!(e.severity, Severity::Warning);
        let shipments = &chain.get(Role::Retailer).pending_shipments;
        assert_eq!(shipments.total(), 5);
        assert_eq!(shipments.amount_due(4), 0);
        let week = shipments.entries()[0].week;
        assert!(week == 5 || week == 6);
    }

    #[test]
    fn spike_tops_up_existing_demand() {
        let mut rng = ChaCha20Rng::seed_from_u64(4);
        let mut chain = SupplyChain::new(12);
        chain.get_mut(Role::Distributor).pending_demands.schedule(8, 6);
        demand_spike(&mut chain, Role::Distributor, 7, &DemandSettings::default(), &mut rng);
        let due = chain.get(Role::Distributor).pending_demands.amount_due(8);
        assert!((9..=12).contains(&due), "{due}");
    }

    #[test]
    fn spike_creates_urgent_demand() {
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        let mut chain = SupplyChain::new(12);
        let settings = DemandSettings::default();
        demand_spike(&mut chain, Role::Retailer, 2, &settings, &mut rng);
        let early = chain.get(Role::Retailer).pending_demands.amount_due(3);
        assert!((4..=8).contains(&early), "{early}");

        demand_spike(&mut chain, Role::Retailer, 9, &settings, &mut rng);
        let late = chain.get(Role::Retailer).pending_demands.amount_due(10);
        assert!((8..=16).contains(&late), "{late}");
    }

    #[test]
    fn quality_loss_and_surplus_bounds() {
        let mut rng = ChaCha20Rng::seed_from_u64(6);
        let mut chain = SupplyChain::new(20);
        let e = quality_loss(&mut chain, Role::Factory, 1, &mut rng);
        assert_eq!(e.severity, Severity::Error);
        let after_loss = chain.get(Role::Factory).inventory;
        assert!((14..=18).contains(&after_loss), "{after_loss}");

        let mut chain = SupplyChain::new(20);
        let e = surplus(&mut chain, Role::Factory, 1, &mut rng);
        assert_eq!(e.severity, Severity::Success);
        let after_surplus = chain.get(Role::Factory).inventory;
        assert!((23..=25).contains(&after_surplus), "{after_surplus}");

        let mut empty = SupplyChain::new(0);
        quality_loss(&mut empty, Role::Retailer, 1, &mut rng);
        assert_eq!(empty.get(Role::Retailer).inventory, 0);
    }

    #[test]
    fn rolls_map_to_four_equal_buckets() {
        assert_eq!(effect_for(0.0), EventKind::ShipmentDelayed);
        assert_eq!(effect_for(0.2499), EventKind::ShipmentDelayed);
        assert_eq!(effect_for(0.25), EventKind::DemandSpike);
        assert_eq!(effect_for(0.4999), EventKind::DemandSpike);
        assert_eq!(effect_for(0.5), EventKind::QualityLoss);
        assert_eq!(effect_for(0.75), EventKind::Surplus);
        assert_eq!(effect_for(0.9999), EventKind::Surplus);
    }

    #[test]
    fn spike_on_huge_demand_saturates() {
        let mut rng = ChaCha20Rng::seed_from_u64(9);
        let mut chain = SupplyChain::new(12);
        chain
            .get_mut(Role::Wholesaler)
            .pending_demands
            .schedule(u32::MAX, u32::MAX - 1);
        demand_spike(&mut chain, Role::Wholesaler, u32::MAX - 1, &DemandSettings::default(), &mut rng);
        let due = chain.get(Role::Wholesaler).pending_demands.amount_due(u32::MAX);
        assert_eq!(due, u32::MAX);
    }
}
