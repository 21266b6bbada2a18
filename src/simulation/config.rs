// src/simulation/config.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::io::demand::{DemandPattern, DemandSettings};
use crate::model::agent::Role;
use crate::simulation::error::ConfigError;
use crate::strategy::implementations::Strategy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    /// One human seat, the other three roles played by the AI.
    #[default]
    Solo,
    /// Invitation-code multiplayer. No transport exists.
    Private,
    /// Public lobby multiplayer. No transport exists.
    Public,
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GameMode::Solo => "solo",
            GameMode::Private => "private",
            GameMode::Public => "public",
        })
    }
}

impl FromStr for GameMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "solo" => Ok(GameMode::Solo),
            "private" => Ok(GameMode::Private),
            "public" => Ok(GameMode::Public),
            _ => Err(ConfigError::UnknownMode(s.to_string())),
        }
    }
}

/// Standard Beer Game costs: $0.50 per inventory unit, $1.00 per backlog unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostRates {
    pub inventory: f64,
    pub backlog: f64,
}

impl Default for CostRates {
    fn default() -> Self {
        Self {
            inventory: 0.5,
            backlog: 1.0,
        }
    }
}

/// Longest shipping or information delay accepted.
pub const MAX_DELAY: u32 = 52;
pub const MAX_TOTAL_WEEKS: u32 = 1040;
/// Ceiling on configured order and demand quantities.
pub const MAX_QUANTITY: u32 = 100_000;

/// Everything `Engine::initialize` needs. Missing keys take their defaults and
/// unknown keys are ignored when loading from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub human_role: Role,
    pub mode: GameMode,
    pub demand_pattern: DemandPattern,
    pub total_weeks: u32,
    pub initial_inventory: u32,
    /// Steady-state weekly order used to prime the pipelines.
    pub initial_order: u32,
    pub cost_rates: CostRates,
    pub shipping_delay: u32,
    pub information_delay: u32,
    pub random_event_probability: f64,
    /// Forces one strategy on every AI role instead of the per-role mix.
    pub ai_strategy: Option<Strategy>,
    pub demand: DemandSettings,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            human_role: Role::Retailer,
            mode: GameMode::Solo,
            demand_pattern: DemandPattern::Step,
            total_weeks: 35,
            initial_inventory: 12,
            initial_order: 4,
            cost_rates: CostRates::default(),
            shipping_delay: 2,
            information_delay: 1,
            random_event_probability: 0.15,
            ai_strategy: None,
            demand: DemandSettings::default(),
        }
    }
}

impl GameConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_TOTAL_WEEKS).contains(&self.total_weeks) {
            return Err(invalid(
                "total_weeks",
                format!("must be between 1 and {MAX_TOTAL_WEEKS}"),
            ));
        }
        for (field, delay) in [
            ("shipping_delay", self.shipping_delay),
            ("information_delay", self.information_delay),
        ] {
            if !(1..=MAX_DELAY).contains(&delay) {
                return Err(invalid(
                    field,
                    format!("must be between 1 and {MAX_DELAY} weeks"),
                ));
            }
        }
        for (field, quantity) in [
            ("initial_order", self.initial_order),
            ("demand.base", self.demand.base),
            ("demand.step", self.demand.step),
            ("demand.minimum", self.demand.minimum),
            ("demand.jitter", self.demand.jitter),
        ] {
            if quantity > MAX_QUANTITY {
                return Err(invalid(field, format!("{quantity} exceeds {MAX_QUANTITY}")));
            }
        }
        if !self.demand.seasonal_amplitude.is_finite()
            || self.demand.seasonal_amplitude.abs() > MAX_QUANTITY as f64
        {
            return Err(invalid(
                "demand.seasonal_amplitude",
                format!("{} is out of range", self.demand.seasonal_amplitude),
            ));
        }
        if !(0.0..=1.0).contains(&self.random_event_probability) {
            return Err(invalid(
                "random_event_probability",
                format!("{} is outside [0, 1]", self.random_event_probability),
            ));
        }
        for (field, rate) in [
            ("cost_rates.inventory", self.cost_rates.inventory),
            ("cost_rates.backlog", self.cost_rates.backlog),
        ] {
            if !rate.is_finite() || rate < 0.0 {
                return Err(invalid(field, format!("{rate} is not a non-negative rate")));
            }
        }
        if self.demand.step_week == 0 {
            return Err(invalid("demand.step_week", "must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_board_game() {
        let config = GameConfig::default();
        assert_eq!(config.total_weeks, 35);
        assert_eq!(config.initial_inventory, 12);
        assert_eq!(config.shipping_delay, 2);
        assert_eq!(config.information_delay, 1);
        assert_eq!(config.cost_rates, CostRates { inventory: 0.5, backlog: 1.0 });
        assert!(config.validate().is_ok());
    }

    #[test]
    fn json_fills_missing_keys_and_ignores_unknown_ones() {
        let config = GameConfig::from_json(
            r#"{"human_role": "factory", "demand_pattern": "seasonal", "theme": "dark"}"#,
        )
        .unwrap();
        assert_eq!(config.human_role, Role::Factory);
        assert_eq!(config.demand_pattern, DemandPattern::Seasonal);
        assert_eq!(config.total_weeks, 35);
    }

    #[test]
    fn json_rejects_unknown_role() {
        let err = GameConfig::from_json(r#"{"human_role": "brewer"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn validate_rejects_bad_probability() {
        let config = GameConfig {
            random_event_probability: 1.5,
            ..GameConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "random_event_probability", .. })
        ));
    }

    #[test]
    fn validate_rejects_out_of_range_delays() {
        for (field, config) in [
            (
                "shipping_delay",
                GameConfig {
                    shipping_delay: u32::MAX,
                    ..GameConfig::default()
                },
            ),
            (
                "information_delay",
                GameConfig {
                    information_delay: MAX_DELAY + 1,
                    ..GameConfig::default()
                },
            ),
            (
                "total_weeks",
                GameConfig {
                    total_weeks: u32::MAX,
                    ..GameConfig::default()
                },
            ),
        ] {
            match config.validate() {
                Err(ConfigError::Invalid { field: got, .. }) => assert_eq!(got, field),
                other => panic!("{field}: {other:?}"),
            }
        }
        let longest = GameConfig {
            shipping_delay: MAX_DELAY,
            information_delay: MAX_DELAY,
            ..GameConfig::default()
        };
        assert!(longest.validate().is_ok());
    }

    #[test]
    fn validate_rejects_huge_demand() {
        let mut config = GameConfig::default();
        config.demand.base = u32::MAX - 1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "demand.base", .. })
        ));

        let mut config = GameConfig::default();
        config.demand.seasonal_amplitude = f64::INFINITY;
        assert!(config.validate().is_err());
    }

    #[test]
    fn parse_mode_names() {
        assert_eq!("Solo".parse::<GameMode>().ok(), Some(GameMode::Solo));
        assert!("arena".parse::<GameMode>().is_err());
    }
}
