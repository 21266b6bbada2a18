//! Beer Distribution Game: a four-stage supply chain (factory, distributor,
//! wholesaler, retailer) with shipping and information delays, one human seat
//! and AI-played neighbors.
//!
//! [`Engine`] owns the whole simulation. Drive it with
//! [`Engine::place_order`] and [`Engine::advance_week`], observe it through
//! [`Engine::snapshot`].

pub mod io;
pub mod model;
pub mod simulation;
pub mod strategy;

pub use crate::io::demand::{DemandPattern, DemandSettings};
pub use crate::model::agent::Role;
pub use crate::simulation::config::{CostRates, GameConfig, GameMode};
pub use crate::simulation::engine::{Engine, Phase};
pub use crate::simulation::error::{ConfigError, GameError};
pub use crate::simulation::snapshot::{SimulationStateView, WeekSummary};
pub use crate::strategy::implementations::Strategy;
