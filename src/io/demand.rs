// src/io/demand.rs

use rand::Rng;
use rand_distr::{Distribution, Uniform};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use crate::simulation::error::ConfigError;

/// Shape of the exogenous customer demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DemandPattern {
    /// Base demand with a small jitter.
    Constant,
    /// The classic MIT Beer Game pattern: base demand, then a sudden jump.
    #[default]
    Step,
    /// Uniform integer in [2, 9].
    Random,
    /// Sine wave around the base demand.
    Seasonal,
    /// Deterministic spikes and dips on a 3/5/7 week rhythm.
    Volatile,
}

impl DemandPattern {
    pub fn as_str(self) -> &'static str {
        match self {
            DemandPattern::Constant => "constant",
            DemandPattern::Step => "step",
            DemandPattern::Random => "random",
            DemandPattern::Seasonal => "seasonal",
            DemandPattern::Volatile => "volatile",
        }
    }
}

impl fmt::Display for DemandPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DemandPattern {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "constant" => Ok(DemandPattern::Constant),
            "step" => Ok(DemandPattern::Step),
            "random" => Ok(DemandPattern::Random),
            "seasonal" => Ok(DemandPattern::Seasonal),
            "volatile" => Ok(DemandPattern::Volatile),
            _ => Err(ConfigError::UnknownPattern(s.to_string())),
        }
    }
}

/// Tunables for the demand patterns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemandSettings {
    pub base: u32,
    /// Demand after the jump of the `step` pattern.
    pub step: u32,
    /// First week of the raised demand.
    pub step_week: u32,
    /// Floor applied to every generated value.
    pub minimum: u32,
    /// Half-width of the integer jitter on `constant` and `step` (0 disables it).
    pub jitter: u32,
    pub seasonal_amplitude: f64,
    pub seasonal_period: u32,
}

impl Default for DemandSettings {
    fn default() -> Self {
        Self {
            base: 4,
            step: 8,
            step_week: 5,
            minimum: 1,
            jitter: 1,
            seasonal_amplitude: 4.0,
            seasonal_period: 12,
        }
    }
}

/// Customer demand for `week` under `pattern`.
///
/// Pure in `(pattern, week)` except for the jitter and the `random` and
/// `volatile` draws, which come from `rng`.
pub fn generate<R: Rng + ?Sized>(
    pattern: DemandPattern,
    week: u32,
    settings: &DemandSettings,
    rng: &mut R,
) -> u32 {
    let base = settings.base as f64;

    let raw: i64 = match pattern {
        DemandPattern::Constant => settings.base as i64 + jitter(settings.jitter, rng),
        DemandPattern::Step => {
            if week < settings.step_week {
                settings.base as i64 + jitter(settings.jitter, rng)
            } else if week == settings.step_week {
                // The jump itself is exact so it is recognisable
                settings.step as i64
            } else {
                settings.step as i64 + jitter(settings.jitter, rng)
            }
        }
        DemandPattern::Random => Uniform::new_inclusive(2i64, 9).sample(rng),
        DemandPattern::Seasonal => {
            let period = settings.seasonal_period.max(1) as f64;
            let phase = 2.0 * PI * week as f64 / period;
            (base + settings.seasonal_amplitude * phase.sin()).round() as i64
        }
        DemandPattern::Volatile => {
            let multiplier = if week % 3 == 0 {
                2.5
            } else if week % 5 == 0 {
                1.8
            } else if week % 7 == 0 {
                0.6
            } else {
                Uniform::new(0.6, 1.4).sample(rng)
            };
            (base * multiplier).round() as i64
        }
    };

    raw.max(settings.minimum as i64) as u32
}

/// True exactly in the week the `step` pattern jumps.
pub fn is_step_week(pattern: DemandPattern, week: u32, settings: &DemandSettings) -> bool {
    pattern == DemandPattern::Step && week == settings.step_week
}

fn jitter<R: Rng + ?Sized>(half_width: u32, rng: &mut R) -> i64 {
    if half_width == 0 {
        return 0;
    }
    let w = half_width as i64;
    Uniform::new_inclusive(-w, w).sample(rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn calm() -> DemandSettings {
        DemandSettings {
            jitter: 0,
            ..DemandSettings::default()
        }
    }

    #[test]
    fn step_jumps_at_week_five() {
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let s = calm();
        let schedule: Vec<u32> = (1..=8)
            .map(|w| generate(DemandPattern::Step, w, &s, &mut rng))
            .collect();
        assert_eq!(schedule, vec![4, 4, 4, 4, 8, 8, 8, 8]);
        assert!(is_step_week(DemandPattern::Step, 5, &s));
        assert!(!is_step_week(DemandPattern::Step, 6, &s));
        assert!(!is_step_week(DemandPattern::Constant, 5, &s));
    }

    #[test]
    fn jitter_stays_within_one_unit() {
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        let s = DemandSettings::default();
        for week in 1..200 {
            let d = generate(DemandPattern::Constant, week, &s, &mut rng);
            assert!((3..=5).contains(&d), "week {week}: {d}");
        }
    }

    #[test]
    fn random_pattern_range() {
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let s = calm();
        for week in 1..500 {
            let d = generate(DemandPattern::Random, week, &s, &mut rng);
            assert!((2..=9).contains(&d));
        }
    }

    #[test]
    fn seasonal_follows_the_sine() {
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        let s = calm();
        // sin(2*pi*3/12) = 1, sin(2*pi*9/12) = -1
        assert_eq!(generate(DemandPattern::Seasonal, 3, &s, &mut rng), 8);
        assert_eq!(generate(DemandPattern::Seasonal, 6, &s, &mut rng), 4);
        assert_eq!(generate(DemandPattern::Seasonal, 9, &s, &mut rng), 1);
    }

    #[test]
    fn volatile_spikes_are_deterministic() {
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        let s = calm();
        assert_eq!(generate(DemandPattern::Volatile, 3, &s, &mut rng), 10);
        assert_eq!(generate(DemandPattern::Volatile, 5, &s, &mut rng), 7);
        assert_eq!(generate(DemandPattern::Volatile, 7, &s, &mut rng), 2);
        // 15 is divisible by both 3 and 5; the x2.5 spike wins
        assert_eq!(generate(DemandPattern::Volatile, 15, &s, &mut rng), 10);
        for week in [1, 2, 4, 8, 11] {
            let d = generate(DemandPattern::Volatile, week, &s, &mut rng);
            assert!((2..=6).contains(&d), "week {week}: {d}");
        }
    }

    #[test]
    fn minimum_floor_applies() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let s = DemandSettings {
            base: 0,
            jitter: 0,
            minimum: 2,
            ..DemandSettings::default()
        };
        assert_eq!(generate(DemandPattern::Constant, 1, &s, &mut rng), 2);
    }

    #[test]
    fn parse_pattern_names() {
        assert_eq!("VOLATILE".parse::<DemandPattern>().ok(), Some(DemandPattern::Volatile));
        assert!(matches!(
            "chaotic".parse::<DemandPattern>(),
            Err(ConfigError::UnknownPattern(_))
        ));
    }
}
