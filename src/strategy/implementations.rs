// src/strategy/implementations.rs

use rand::{Rng, RngCore};
use rand_distr::{Bernoulli, Distribution, Uniform};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::model::agent::Role;
use crate::simulation::error::ConfigError;
use crate::strategy::traits::{OrderContext, OrderPolicy};

/// Extra units a careful entity keeps on top of strict need.
/// Entities higher in the chain hold more.
pub fn base_safety_stock(role: Role) -> u32 {
    match role {
        Role::Factory => 6,
        Role::Distributor => 5,
        Role::Wholesaler => 4,
        Role::Retailer => 3,
    }
}

/// How much an aggressive entity inflates the demand it sees.
/// Higher in the chain means a larger swing.
pub fn amplification_factor(role: Role) -> f64 {
    match role {
        Role::Retailer => 1.2,
        Role::Wholesaler => 1.5,
        Role::Distributor => 1.8,
        Role::Factory => 2.0,
    }
}

/// Demand plus backlog minus stock on hand, which may be negative.
fn net_requirement(ctx: &OrderContext) -> i64 {
    ctx.demand as i64 + ctx.backlog as i64 - ctx.inventory as i64
}

fn clamp_order(raw: i64) -> u32 {
    // We cannot order negative amounts.
    raw.clamp(0, u32::MAX as i64) as u32
}

// =========================================================================
// 1. Reactive Policy
// =========================================================================

/// Orders exactly what is needed to cover demand and backlog.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReactivePolicy;

impl OrderPolicy for ReactivePolicy {
    fn calculate_order(&self, ctx: &OrderContext, _rng: &mut dyn RngCore) -> u32 {
        clamp_order(net_requirement(ctx))
    }
}

// =========================================================================
// 2. Conservative Policy
// =========================================================================

/// Reactive plus a safety stock scaled by role and lead time.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConservativePolicy;

impl OrderPolicy for ConservativePolicy {
    fn calculate_order(&self, ctx: &OrderContext, _rng: &mut dyn RngCore) -> u32 {
        let safety_stock = base_safety_stock(ctx.role) + ctx.lead_time;
        clamp_order(net_requirement(ctx) + safety_stock as i64)
    }
}

// =========================================================================
// 3. Aggressive Policy
// =========================================================================

/// Over-reacts to demand. This is the knob that produces the bullwhip:
/// the further upstream, the stronger the amplification.
#[derive(Debug, Clone, Copy, Default)]
pub struct AggressivePolicy;

impl OrderPolicy for AggressivePolicy {
    fn calculate_order(&self, ctx: &OrderContext, _rng: &mut dyn RngCore) -> u32 {
        let factor = amplification_factor(ctx.role);
        let amplified_demand = (ctx.demand as f64 * factor).round() as i64;
        let safety_stock = (base_safety_stock(ctx.role) as f64 * 2.0 * factor).round() as i64;

        clamp_order(amplified_demand + ctx.backlog as i64 - ctx.inventory as i64 + safety_stock)
    }
}

// =========================================================================
// 4. Random Policy
// =========================================================================

/// Reactive order, nudged by a random offset in [-1, +4] and scaled by a
/// random factor in [0.8, 1.2]. Useful for simulating chaotic actors.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPolicy;

impl OrderPolicy for RandomPolicy {
    fn calculate_order(&self, ctx: &OrderContext, rng: &mut dyn RngCore) -> u32 {
        let offset: i64 = Uniform::new_inclusive(-1, 4).sample(rng);
        let scale: f64 = Uniform::new_inclusive(0.8, 1.2).sample(rng);
        let order = ((net_requirement(ctx) + offset) as f64 * scale).round() as i64;
        clamp_order(order)
    }
}

static REACTIVE: ReactivePolicy = ReactivePolicy;
static CONSERVATIVE: ConservativePolicy = ConservativePolicy;
static AGGRESSIVE: AggressivePolicy = AggressivePolicy;
static RANDOM: RandomPolicy = RandomPolicy;

/// Named AI strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Reactive,
    Conservative,
    Aggressive,
    Random,
}

impl Strategy {
    pub fn policy(self) -> &'static dyn OrderPolicy {
        match self {
            Strategy::Reactive => &REACTIVE,
            Strategy::Conservative => &CONSERVATIVE,
            Strategy::Aggressive => &AGGRESSIVE,
            Strategy::Random => &RANDOM,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Reactive => "reactive",
            Strategy::Conservative => "conservative",
            Strategy::Aggressive => "aggressive",
            Strategy::Random => "random",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reactive" => Ok(Strategy::Reactive),
            "conservative" => Ok(Strategy::Conservative),
            "aggressive" => Ok(Strategy::Aggressive),
            "random" => Ok(Strategy::Random),
            _ => Err(ConfigError::UnknownStrategy(s.to_string())),
        }
    }
}

/// Chance that a distributor or wholesaler plays it safe in a given week.
const CONSERVATIVE_SHARE: f64 = 0.6;

/// Picks this week's strategy for an AI-controlled role.
///
/// The factory is conservative and the retailer reactive. The middle of the
/// chain mixes conservative and aggressive weeks. An override forces one
/// strategy everywhere.
pub fn assign_strategy<R: Rng + ?Sized>(
    role: Role,
    forced: Option<Strategy>,
    rng: &mut R,
) -> Strategy {
    if let Some(strategy) = forced {
        return strategy;
    }
    match role {
        Role::Factory => Strategy::Conservative,
        Role::Retailer => Strategy::Reactive,
        Role::Distributor | Role::Wholesaler => {
            let conservative = Bernoulli::new(CONSERVATIVE_SHARE)
                .map(|b| b.sample(rng))
                .unwrap_or(true);
            if conservative {
                Strategy::Conservative
            } else {
                Strategy::Aggressive
            }
        }
    }
}
