// src/io/presenter.rs

use log::{error, info, warn};

use crate::simulation::events::{GameEvent, Severity};
use crate::simulation::snapshot::{SimulationStateView, WeekSummary};

/// Something that shows the game to a player: a terminal, a chart, a UI.
///
/// The engine never calls it. The driver hands it summaries and snapshots
/// after each operation, and it only ever reads them.
pub trait Presenter {
    fn present_week(&mut self, summary: &WeekSummary);

    fn present_event(&mut self, event: &GameEvent);

    /// Called once the game is over.
    fn present_final(&mut self, _state: &SimulationStateView) {}
}

/// Renders through the `log` facade, one line per event.
#[derive(Debug, Default)]
pub struct LogPresenter {
    /// Print every week instead of every fifth.
    pub verbose: bool,
}

impl LogPresenter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Presenter for LogPresenter {
    fn present_week(&mut self, summary: &WeekSummary) {
        for event in &summary.events {
            self.present_event(event);
        }
        if self.verbose || summary.week % 5 == 0 {
            let line: Vec<String> = summary
                .entities
                .iter()
                .map(|e| format!("{} {}/{}", e.role, e.inventory, e.backlog))
                .collect();
            info!(
                "Week {}: [{}] delivered {}, cost {:.2}, bullwhip {:.2}",
                summary.week,
                line.join(", "),
                summary.delivered,
                summary.cost_delta,
                summary.bullwhip_effect
            );
        }
    }

    fn present_event(&mut self, event: &GameEvent) {
        match event.severity {
            Severity::Error => error!("[week {}] {}", event.week, event.message),
            Severity::Warning => warn!("[week {}] {}", event.week, event.message),
            Severity::Info | Severity::Success => {
                info!("[week {}] {}", event.week, event.message)
            }
        }
    }

    fn present_final(&mut self, state: &SimulationStateView) {
        info!("=== Cost Analysis ===");
        for entity in &state.entities {
            info!("{}: ${:.2}", entity.role, entity.total_cost);
        }
        let chain_total: f64 = state.entities.iter().map(|e| e.total_cost).sum();
        info!("Your cost: ${:.2}", state.total_cost);
        info!("Total Supply Chain Cost: ${:.2}", chain_total);
        info!("Bullwhip effect: {:.2}", state.bullwhip_effect);
    }
}
