//! Typed, layered configuration: defaults matching spec §6, overridable by
//! an optional TOML file and `DIRECTOR__`-prefixed environment variables.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::director::event::Priority;

pub(crate) mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Ok(Duration::from_secs_f64(secs))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaskConfig {
    pub stability: f32,
    pub stability_decay: f32,
    pub min_stability: f32,
    pub debt_weight: f32,
    pub debt_growth: f32,
    pub debt_decay: f32,
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            stability: 0.70,
            stability_decay: 0.05,
            min_stability: 0.30,
            debt_weight: 1.0,
            debt_growth: 0.02,
            debt_decay: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebounceConfig {
    #[serde(with = "duration_secs")]
    pub state: Duration,
    #[serde(with = "duration_secs")]
    pub damage: Duration,
    #[serde(with = "duration_secs")]
    pub milestone: Duration,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            state: Duration::from_secs(15),
            damage: Duration::from_secs(5),
            milestone: Duration::from_secs(3),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PhaseThresholds {
    pub rising: f64,
    pub critical: f64,
    pub breaking: f64,
    pub apocalypse: f64,
}

impl Default for PhaseThresholds {
    fn default() -> Self {
        Self { rising: 50.0, critical: 80.0, breaking: 120.0, apocalypse: 150.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectorConfig {
    pub mask: MaskConfig,
    pub debounce: DebounceConfig,
    pub chat_buffer: usize,
    pub queue_capacity: usize,
    pub context_tokens: usize,
    pub phase_thresholds: PhaseThresholds,
    pub max_mobs_per_run: u32,
    pub max_tnt_per_run: u32,
    pub max_hostile_effects_per_run: u32,
    pub health_floor: f32,
    #[serde(with = "duration_secs")]
    pub model_timeout: Duration,
    #[serde(with = "duration_secs")]
    pub chat_timeout: Duration,
    /// Open question from spec §9: priority for bulk mob-kill telemetry.
    /// Resolved to LOW — a single kill never needs to pre-empt chat or
    /// damage, and the debounce class already keeps the feed quiet.
    pub mob_kill_priority: Priority,
}

impl Default for DirectorConfig {
    fn default() -> Self {
        Self {
            mask: MaskConfig::default(),
            debounce: DebounceConfig::default(),
            chat_buffer: 50,
            queue_capacity: 256,
            context_tokens: 25_000,
            phase_thresholds: PhaseThresholds::default(),
            max_mobs_per_run: 40,
            max_tnt_per_run: 10,
            max_hostile_effects_per_run: 20,
            health_floor: 1.0,
            model_timeout: Duration::from_secs(8),
            chat_timeout: Duration::from_secs(3),
            mob_kill_priority: Priority::Low,
        }
    }
}

impl DirectorConfig {
    /// Layers defaults, an optional TOML file, then environment variables
    /// (`DIRECTOR__MASK__STABILITY=0.8`, double-underscore separated).
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let defaults = config::Config::try_from(&Self::default())?;
        let mut builder = config::Config::builder().add_source(defaults);
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }
        builder = builder.add_source(config::Environment::with_prefix("DIRECTOR").separator("__"));
        builder.build()?.try_deserialize()
    }

    /// A faster-paced variant for tests and the scenario runner: debounce
    /// windows collapse to zero so scripted events never get swallowed.
    pub fn for_testing() -> Self {
        Self {
            debounce: DebounceConfig { state: Duration::ZERO, damage: Duration::ZERO, milestone: Duration::ZERO },
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_thresholds_are_strictly_increasing() {
        let t = PhaseThresholds::default();
        assert!(t.rising < t.critical);
        assert!(t.critical < t.breaking);
        assert!(t.breaking < t.apocalypse);
    }

    #[test]
    fn default_round_trips_through_serde_json() {
        let config = DirectorConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: DirectorConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.chat_buffer, config.chat_buffer);
    }
}
