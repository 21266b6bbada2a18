pub mod bullwhip;
pub mod config;
pub mod costs;
pub mod engine;
pub mod error;
pub mod events;
pub mod router;
pub mod snapshot;
