// src/simulation/error.rs

use thiserror::Error;

use crate::simulation::config::GameMode;

/// Rejected configuration. The engine keeps its previous state.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown role: {0:?} (expected factory, distributor, wholesaler or retailer)")]
    UnknownRole(String),
    #[error("unknown demand pattern: {0:?} (expected constant, step, random, seasonal or volatile)")]
    UnknownPattern(String),
    #[error("unknown AI strategy: {0:?} (expected reactive, conservative, aggressive or random)")]
    UnknownStrategy(String),
    #[error("unknown game mode: {0:?} (expected solo, private or public)")]
    UnknownMode(String),
    #[error("game mode {0} has no transport and cannot be simulated")]
    UnsupportedMode(GameMode),
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors surfaced by the engine's public operations. None of them mutate state.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("order amount must be a non-negative integer, got {amount}")]
    InvalidOrder { amount: i64 },
    #[error("an order was already placed in week {week}")]
    AlreadyOrdered { week: u32 },
    #[error("no order placed for week {week}")]
    OrderNotPlaced { week: u32 },
    #[error("the game is over")]
    GameCompleted,
    #[error("the game has not been initialized")]
    NotInitialized,
    #[error("a game is in progress; reset it before changing mode or role")]
    GameInProgress,
    #[error(transparent)]
    Config(#[from] ConfigError),
}
