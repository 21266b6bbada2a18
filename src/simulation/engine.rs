// src/simulation/engine.rs

use log::{debug, info, trace};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::Serialize;

use crate::io::demand;
use crate::model::agent::{FulfillmentOutcome, Role, SupplyChain};
use crate::simulation::bullwhip::BullwhipAnalyzer;
use crate::simulation::config::{GameConfig, GameMode};
use crate::simulation::costs::{self, CostAccountant};
use crate::simulation::error::{ConfigError, GameError};
use crate::simulation::events::{EventKind, EventLog, GameEvent, RandomEventInjector, Severity};
use crate::simulation::router::OrderRouter;
use crate::simulation::snapshot::{
    EntityStatus, EntityView, HistoryRecord, SimulationStateView, WeekSummary,
};
use crate::strategy::implementations::assign_strategy;
use crate::strategy::traits::OrderContext;

/// Lifecycle of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Phase {
    Uninitialized,
    /// Mode and role being picked before `initialize`.
    Configuring {
        mode: Option<GameMode>,
        role: Option<Role>,
    },
    /// Waiting for the human order of the current week.
    WeekReady,
    /// Order placed, waiting for `advance_week`.
    WeekResolved,
    Completed,
}

/// The Beer Game simulation.
///
/// Owns every entity and pipeline. Callers drive it with `place_order` and
/// `advance_week` and observe it through `snapshot`. All randomness comes from
/// the injected `rng`, so a seeded engine replays exactly.
#[derive(Debug)]
pub struct Engine<R = ChaCha20Rng> {
    rng: R,
    phase: Phase,
    config: GameConfig,
    router: OrderRouter,
    injector: RandomEventInjector,
    chain: SupplyChain,
    week: u32,
    costs: CostAccountant,
    inventory_history: Vec<u32>,
    backlog_history: Vec<u32>,
    order_history: Vec<u32>,
    demand_history: Vec<u32>,
    delivered_last_week: u32,
    bullwhip: BullwhipAnalyzer,
    events: EventLog,
    history: Vec<HistoryRecord>,
}

impl Engine<ChaCha20Rng> {
    pub fn new() -> Self {
        Self::with_rng(ChaCha20Rng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(ChaCha20Rng::seed_from_u64(seed))
    }
}

impl Default for Engine<ChaCha20Rng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> Engine<R> {
    pub fn with_rng(rng: R) -> Self {
        let config = GameConfig::default();
        Self {
            rng,
            phase: Phase::Uninitialized,
            router: OrderRouter::new(config.information_delay, config.shipping_delay),
            injector: RandomEventInjector::new(config.random_event_probability),
            chain: SupplyChain::new(config.initial_inventory),
            config,
            week: 1,
            costs: CostAccountant::new(),
            inventory_history: Vec::new(),
            backlog_history: Vec::new(),
            order_history: Vec::new(),
            demand_history: Vec::new(),
            delivered_last_week: 0,
            bullwhip: BullwhipAnalyzer::default(),
            events: EventLog::new(),
            history: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn week(&self) -> u32 {
        self.week
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Per-week, per-role records of every resolved week.
    pub fn history(&self) -> &[HistoryRecord] {
        &self.history
    }

    pub fn is_completed(&self) -> bool {
        self.phase == Phase::Completed
    }

    /// Picks the game mode ahead of `initialize`.
    pub fn set_mode(&mut self, mode: GameMode) -> Result<(), GameError> {
        let role = self.configuring_role()?;
        self.phase = Phase::Configuring {
            mode: Some(mode),
            role,
        };
        Ok(())
    }

    /// Picks the human seat ahead of `initialize`.
    pub fn set_role(&mut self, role: Role) -> Result<(), GameError> {
        let mode = match self.phase {
            Phase::Uninitialized => None,
            Phase::Configuring { mode, .. } => mode,
            _ => return Err(GameError::GameInProgress),
        };
        self.phase = Phase::Configuring {
            mode,
            role: Some(role),
        };
        Ok(())
    }

    fn configuring_role(&self) -> Result<Option<Role>, GameError> {
        match self.phase {
            Phase::Uninitialized => Ok(None),
            Phase::Configuring { role, .. } => Ok(role),
            _ => Err(GameError::GameInProgress),
        }
    }

    /// Starts a new game at week 1.
    ///
    /// A mode or role picked with `set_mode`/`set_role` takes precedence over
    /// the one in `config`. On error nothing changes.
    pub fn initialize(&mut self, mut config: GameConfig) -> Result<(), GameError> {
        if let Phase::Configuring { mode, role } = self.phase {
            if let Some(mode) = mode {
                config.mode = mode;
            }
            if let Some(role) = role {
                config.human_role = role;
            }
        }
        config.validate()?;
        if config.mode != GameMode::Solo {
            return Err(ConfigError::UnsupportedMode(config.mode).into());
        }

        let router = OrderRouter::new(config.information_delay, config.shipping_delay);
        let mut chain = SupplyChain::new(config.initial_inventory);
        let seed_order = config.initial_order;

        // Prime the pipelines so the first weeks look like a running game
        for role in Role::ALL {
            let first_arrival = match role.upstream() {
                Some(_) => 2 + config.shipping_delay,
                None => 1 + router.production_lead_time(),
            };
            let entity = chain.get_mut(role);
            for week in 2..first_arrival {
                entity.pending_shipments.schedule(week, seed_order);
            }
            if role != Role::Retailer {
                for week in 2..=config.information_delay {
                    entity.pending_demands.schedule(week, seed_order);
                }
            }
            entity.incoming_demand = seed_order;
        }
        for role in Role::ALL {
            if role != config.human_role {
                router.place_order(&mut chain, role, seed_order, 1);
            }
        }

        let human = chain.get(config.human_role);
        info!(
            "New game: {} seat, {} demand, {} weeks",
            config.human_role, config.demand_pattern, config.total_weeks
        );

        self.inventory_history = vec![human.inventory];
        self.backlog_history = vec![human.backlog];
        self.router = router;
        self.injector = RandomEventInjector::new(config.random_event_probability);
        self.chain = chain;
        self.config = config;
        self.week = 1;
        self.costs = CostAccountant::new();
        self.order_history.clear();
        self.demand_history.clear();
        self.delivered_last_week = 0;
        self.bullwhip = BullwhipAnalyzer::default();
        self.events = EventLog::new();
        self.history.clear();
        self.phase = Phase::WeekReady;
        Ok(())
    }

    /// Places the human order for the current week.
    pub fn place_order(&mut self, amount: i64) -> Result<(), GameError> {
        match self.phase {
            Phase::WeekReady => {}
            Phase::WeekResolved => return Err(GameError::AlreadyOrdered { week: self.week }),
            Phase::Completed => return Err(GameError::GameCompleted),
            Phase::Uninitialized | Phase::Configuring { .. } => {
                return Err(GameError::NotInitialized)
            }
        }
        let amount = u32::try_from(amount).map_err(|_| GameError::InvalidOrder { amount })?;

        let role = self.config.human_role;
        let routed = self
            .router
            .place_order(&mut self.chain, role, amount, self.week);

        self.order_history.push(amount);
        self.demand_history.push(self.chain.get(role).incoming_demand);

        let message = match (role.upstream(), routed.production_arrival) {
            (Some(supplier), _) => format!(
                "Order of {amount} units sent to {supplier}, due week {}",
                routed.due_week
            ),
            (None, Some(arrival)) => {
                format!("Production run of {amount} units started, in stock week {arrival}")
            }
            (None, None) => format!("Order of {amount} units sent to production"),
        };
        self.events.push(GameEvent::new(
            self.week,
            EventKind::OrderPlaced,
            Severity::Info,
            message,
        ));
        debug!("Week {}: {} ordered {}", self.week, role, amount);

        self.phase = Phase::WeekResolved;
        Ok(())
    }

    /// Resolves the current week and moves to the next one.
    ///
    /// Runs, in order: deliveries, fulfillment, costs, next week's demand, AI
    /// orders, random events, statistics.
    pub fn advance_week(&mut self) -> Result<WeekSummary, GameError> {
        match self.phase {
            Phase::WeekResolved => {}
            Phase::WeekReady => return Err(GameError::OrderNotPlaced { week: self.week }),
            Phase::Completed => return Err(GameError::GameCompleted),
            Phase::Uninitialized | Phase::Configuring { .. } => {
                return Err(GameError::NotInitialized)
            }
        }

        let resolved_week = self.week;
        self.week += 1;
        let week = self.week;
        let mut events = Vec::new();

        self.deliver_shipments(week, &mut events);
        let fulfilled = self.fulfill_demand(week, &mut events);
        let cost_delta = self.account_costs(week, &mut events);
        self.record_history(resolved_week, &fulfilled);
        self.determine_demand(week, &mut events);
        self.run_ai_entities(week);

        let human = self.config.human_role;
        if let Some(event) = self.injector.inject(
            &mut self.chain,
            human,
            week,
            &self.config.demand,
            &mut self.rng,
        ) {
            events.push(event);
        }

        let entity = self.chain.get(human);
        self.inventory_history.push(entity.inventory);
        self.backlog_history.push(entity.backlog);
        let bullwhip = self
            .bullwhip
            .update(&self.order_history, &self.demand_history);

        let completed = resolved_week >= self.config.total_weeks;
        if completed {
            let message = format!(
                "Game over after {} weeks, total cost {:.2}",
                self.config.total_weeks, self.costs.total
            );
            info!("{message}");
            events.push(GameEvent::new(
                week,
                EventKind::GameCompleted,
                Severity::Info,
                message,
            ));
            self.phase = Phase::Completed;
        } else {
            self.phase = Phase::WeekReady;
        }

        debug!(
            "Week {}: {} inventory {}, backlog {}, cost {:.2}, bullwhip {:.2}",
            week,
            human,
            self.inventory_history.last().copied().unwrap_or(0),
            self.backlog_history.last().copied().unwrap_or(0),
            cost_delta,
            bullwhip
        );

        self.events.extend(events.iter().cloned());

        Ok(WeekSummary {
            week,
            entities: self
                .chain
                .iter()
                .map(|e| EntityStatus {
                    role: e.role,
                    inventory: e.inventory,
                    backlog: e.backlog,
                })
                .collect(),
            delivered: self.delivered_last_week,
            cost_delta,
            events,
            bullwhip_effect: bullwhip,
            completed,
        })
    }

    /// Step 1: goods arriving this week land in stock.
    fn deliver_shipments(&mut self, week: u32, events: &mut Vec<GameEvent>) {
        for role in Role::ALL {
            let received = self.router.deliver_shipment(&mut self.chain, role, week);
            if role == self.config.human_role && received > 0 {
                events.push(GameEvent::new(
                    week,
                    EventKind::ShipmentReceived,
                    Severity::Success,
                    format!("Shipment received: {received} units"),
                ));
            }
        }
    }

    /// Step 2: every entity ships against last week's demand plus backlog.
    /// Returns the demand each role faced, in chain order.
    fn fulfill_demand(&mut self, week: u32, events: &mut Vec<GameEvent>) -> [u32; 4] {
        let mut fulfilled = [0u32; 4];
        for role in Role::ALL {
            let entity = self.chain.get_mut(role);
            let demand = entity.incoming_demand;
            let backlog_before = entity.backlog;
            let result = entity.fulfill(demand);
            let backlog_after = entity.backlog;
            fulfilled[role.index()] = demand;

            self.router
                .ship_downstream(&mut self.chain, role, result.delivered, week);

            if role != self.config.human_role {
                continue;
            }
            self.delivered_last_week = result.delivered;
            let event = match result.outcome {
                FulfillmentOutcome::Full if backlog_before > 0 => Some(GameEvent::new(
                    week,
                    EventKind::OrderFulfilled,
                    Severity::Success,
                    format!(
                        "Order filled, including {backlog_before} backlogged units"
                    ),
                )),
                FulfillmentOutcome::Full => None,
                FulfillmentOutcome::Partial => Some(GameEvent::new(
                    week,
                    EventKind::Shortage,
                    Severity::Warning,
                    format!("Short on stock: {backlog_after} units backlogged"),
                )),
                FulfillmentOutcome::Stockout => Some(GameEvent::new(
                    week,
                    EventKind::Stockout,
                    Severity::Error,
                    format!("Out of stock: {backlog_after} units backlogged"),
                )),
            };
            events.extend(event);
        }
        fulfilled
    }

    /// Step 3: holding and backlog costs. Returns the human seat's cost.
    fn account_costs(&mut self, week: u32, events: &mut Vec<GameEvent>) -> f64 {
        let rates = self.config.cost_rates;
        let human = self.config.human_role;
        let mut human_cost = 0.0;

        for entity in self.chain.iter_mut() {
            let cost = costs::weekly_cost(entity, &rates);
            entity.last_cost = cost;
            entity.total_cost += cost;
            if entity.role == human {
                human_cost = self.costs.record(cost);
                if cost > 0.0 {
                    events.push(GameEvent::new(
                        week,
                        EventKind::WeeklyCost,
                        Severity::Info,
                        format!(
                            "Weekly cost: {:.2} (holding {:.2}, backlog {:.2})",
                            cost,
                            entity.inventory as f64 * rates.inventory,
                            entity.backlog as f64 * rates.backlog
                        ),
                    ));
                }
            }
        }
        human_cost
    }

    /// Step 4: demand facing each entity in the new week.
    fn determine_demand(&mut self, week: u32, events: &mut Vec<GameEvent>) {
        let pattern = self.config.demand_pattern;
        let settings = self.config.demand;

        for role in Role::ALL {
            let scheduled = self.chain.get_mut(role).pending_demands.drain_week(week);
            let demand = if role == Role::Retailer {
                scheduled.saturating_add(demand::generate(pattern, week, &settings, &mut self.rng))
            } else {
                scheduled
            };
            self.chain.get_mut(role).incoming_demand = demand;
        }

        if demand::is_step_week(pattern, week, &settings) {
            events.push(GameEvent::new(
                week,
                EventKind::DemandStep,
                Severity::Warning,
                format!(
                    "Customer demand jumped from {} to {} units",
                    settings.base, settings.step
                ),
            ));
        }
    }

    /// Step 5: every AI entity orders for the new week.
    fn run_ai_entities(&mut self, week: u32) {
        for role in Role::ALL {
            if role == self.config.human_role {
                continue;
            }
            let strategy = assign_strategy(role, self.config.ai_strategy, &mut self.rng);
            let entity = self.chain.get(role);
            let context = OrderContext {
                role,
                demand: entity.incoming_demand,
                inventory: entity.inventory,
                backlog: entity.backlog,
                lead_time: self.config.shipping_delay,
            };
            let order = strategy
                .policy()
                .calculate_order(&context, &mut self.rng);
            trace!("Week {week}: {role} ({strategy}) orders {order} for demand {}", context.demand);
            self.router.place_order(&mut self.chain, role, order, week);
        }
    }

    fn record_history(&mut self, week: u32, fulfilled: &[u32; 4]) {
        let human = self.config.human_role;
        for entity in self.chain.iter() {
            self.history.push(HistoryRecord {
                week,
                role: entity.role,
                human: entity.role == human,
                inventory: entity.inventory,
                backlog: entity.backlog,
                incoming_demand: fulfilled[entity.role.index()],
                order_placed: entity.last_order_placed,
                shipment_sent: entity.last_shipment_sent,
                shipment_received: entity.last_shipment_received,
                cost: entity.last_cost,
            });
        }
    }

    /// Deep copy of the current state.
    pub fn snapshot(&self) -> SimulationStateView {
        let initialized = matches!(
            self.phase,
            Phase::WeekReady | Phase::WeekResolved | Phase::Completed
        );
        let human = self.config.human_role;
        SimulationStateView {
            phase: self.phase,
            mode: initialized.then_some(self.config.mode),
            week: self.week,
            total_weeks: self.config.total_weeks,
            human_role: initialized.then_some(human),
            demand_pattern: self.config.demand_pattern,
            entities: self.chain.iter().map(EntityView::from).collect(),
            incoming_order_for_human: self.chain.get(human).incoming_demand,
            delivered_amount_last_week: self.delivered_last_week,
            total_cost: self.costs.total,
            cost_history: self.costs.history.clone(),
            inventory_history: self.inventory_history.clone(),
            backlog_history: self.backlog_history.clone(),
            order_history: self.order_history.clone(),
            demand_history: self.demand_history.clone(),
            bullwhip_effect: self.bullwhip.effect,
            event_log: self.events.to_vec(),
        }
    }

    /// Back to `Uninitialized`. The random stream carries on.
    pub fn reset(&mut self) {
        let config = GameConfig::default();
        self.phase = Phase::Uninitialized;
        self.router = OrderRouter::new(config.information_delay, config.shipping_delay);
        self.injector = RandomEventInjector::new(config.random_event_probability);
        self.chain = SupplyChain::new(config.initial_inventory);
        self.config = config;
        self.week = 1;
        self.costs = CostAccountant::new();
        self.inventory_history.clear();
        self.backlog_history.clear();
        self.order_history.clear();
        self.demand_history.clear();
        self.delivered_last_week = 0;
        self.bullwhip = BullwhipAnalyzer::default();
        self.events = EventLog::new();
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::implementations::Strategy;

    fn quiet_config() -> GameConfig {
        let mut config = GameConfig {
            random_event_probability: 0.0,
            ai_strategy: Some(Strategy::Reactive),
            ..GameConfig::default()
        };
        config.demand.jitter = 0;
        config
    }

    #[test]
    fn initialize_primes_the_pipelines() {
        let mut engine = Engine::with_seed(1);
        engine.initialize(quiet_config()).unwrap();
        assert_eq!(engine.phase(), Phase::WeekReady);

        // Retailer: arrivals in weeks 2 and 3 before the wholesaler's first shipment
        let retailer = engine.chain.get(Role::Retailer);
        assert_eq!(retailer.pending_shipments.amount_due(2), 4);
        assert_eq!(retailer.pending_shipments.amount_due(3), 4);
        assert_eq!(retailer.pending_shipments.amount_due(4), 0);
        assert_eq!(retailer.incoming_demand, 4);

        // The factory orders from production, arriving week 1 + 1 + 2
        let factory = engine.chain.get(Role::Factory);
        assert_eq!(factory.pending_shipments.amount_due(4), 4);

        // AI orders of week 1 are already waiting upstream
        assert_eq!(engine.chain.get(Role::Factory).pending_demands.amount_due(2), 4);
        assert_eq!(engine.chain.get(Role::Distributor).pending_demands.amount_due(2), 4);
        // The human retailer has not ordered yet
        assert_eq!(engine.chain.get(Role::Wholesaler).pending_demands.amount_due(2), 0);
    }

    #[test]
    fn configuring_choices_override_config() {
        let mut engine = Engine::with_seed(2);
        engine.set_mode(GameMode::Solo).unwrap();
        engine.set_role(Role::Distributor).unwrap();
        assert_eq!(
            engine.phase(),
            Phase::Configuring {
                mode: Some(GameMode::Solo),
                role: Some(Role::Distributor)
            }
        );
        engine.initialize(quiet_config()).unwrap();
        assert_eq!(engine.config().human_role, Role::Distributor);
        assert!(matches!(
            engine.set_role(Role::Retailer),
            Err(GameError::GameInProgress)
        ));
    }

    #[test]
    fn multiplayer_modes_are_rejected_without_mutation() {
        let mut engine = Engine::with_seed(3);
        engine.set_mode(GameMode::Public).unwrap();
        let err = engine.initialize(quiet_config()).unwrap_err();
        assert!(matches!(
            err,
            GameError::Config(ConfigError::UnsupportedMode(GameMode::Public))
        ));
        assert!(matches!(engine.phase(), Phase::Configuring { .. }));
    }

    #[test]
    fn week_pipeline_moves_goods_and_orders() {
        let mut engine = Engine::with_seed(4);
        engine.initialize(quiet_config()).unwrap();
        engine.place_order(5).unwrap();
        assert_eq!(
            engine.chain.get(Role::Wholesaler).pending_demands.amount_due(2),
            5
        );

        let summary = engine.advance_week().unwrap();
        assert_eq!(summary.week, 2);
        assert_eq!(summary.delivered, 4);
        // Wholesaler fulfilled its week-1 demand of 4; it reaches the retailer in week 4
        assert_eq!(
            engine.chain.get(Role::Retailer).pending_shipments.amount_due(4),
            4
        );
        // The retailer's order is now the wholesaler's demand
        assert_eq!(engine.chain.get(Role::Wholesaler).incoming_demand, 5);
    }

    #[test]
    fn history_has_one_row_per_role_per_week() {
        let mut engine = Engine::with_seed(5);
        engine.initialize(quiet_config()).unwrap();
        for _ in 0..3 {
            engine.place_order(4).unwrap();
            engine.advance_week().unwrap();
        }
        assert_eq!(engine.history().len(), 12);
        let human_rows: Vec<_> = engine.history().iter().filter(|r| r.human).collect();
        assert_eq!(human_rows.len(), 3);
        assert!(human_rows.iter().all(|r| r.role == Role::Retailer));
        assert_eq!(human_rows[0].week, 1);
        assert_eq!(human_rows[0].incoming_demand, 4);
    }

    #[test]
    fn reset_returns_to_uninitialized() {
        let mut engine = Engine::with_seed(6);
        engine.initialize(quiet_config()).unwrap();
        engine.place_order(4).unwrap();
        engine.advance_week().unwrap();
        engine.reset();
        assert_eq!(engine.phase(), Phase::Uninitialized);
        assert_eq!(engine.week(), 1);
        assert!(matches!(engine.place_order(4), Err(GameError::NotInitialized)));
        assert!(engine.snapshot().event_log.is_empty());
    }
}
