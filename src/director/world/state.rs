//! Plain, immutable-by-convention state structs for the synthetic world.
//! Every transition produces a *new* `WorldState`; nothing here is mutated
//! in place by the pipeline, so a recorded `RunTrace` can always be
//! replayed bit-for-bit.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::director::config::{DirectorConfig, PhaseThresholds};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Overworld,
    Nether,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    Survival,
    Adventure,
    Spectator,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    pub id: String,
    pub role: String,
    pub dimension: Dimension,
    pub health: f32,
    pub max_health: f32,
    pub alive: bool,
    pub game_mode: GameMode,
    pub advancements: Vec<String>,
    pub inventory: HashMap<String, u32>,
    pub mob_kills: u32,
    pub damage_taken: f32,
    pub fear: f32,
    pub aura: i64,
}

impl PlayerState {
    pub fn new(id: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: role.into(),
            dimension: Dimension::Overworld,
            health: 20.0,
            max_health: 20.0,
            alive: true,
            game_mode: GameMode::Survival,
            advancements: Vec::new(),
            inventory: HashMap::new(),
            mob_kills: 0,
            damage_taken: 0.0,
            fear: 0.0,
            aura: 0,
        }
    }

    /// Clamps health into `[0, max_health]` and keeps `alive` consistent
    /// with it — the invariant spec §8 calls out explicitly.
    pub fn set_health(&mut self, health: f32) {
        self.health = health.clamp(0.0, self.max_health);
        if self.health <= 0.0 {
            self.alive = false;
            self.game_mode = GameMode::Spectator;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weather {
    Clear,
    Rain,
    Thunder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Normal,
    Rising,
    Critical,
    Breaking,
    Apocalypse,
}

pub fn phase_for(fracture: f64, thresholds: &PhaseThresholds, apocalypse_reached: bool) -> Phase {
    if apocalypse_reached || fracture >= thresholds.apocalypse {
        Phase::Apocalypse
    } else if fracture >= thresholds.breaking {
        Phase::Breaking
    } else if fracture >= thresholds.critical {
        Phase::Critical
    } else if fracture >= thresholds.rising {
        Phase::Rising
    } else {
        Phase::Normal
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mob {
    pub id: String,
    pub mob_type: String,
    pub target: Option<String>,
    pub alive: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldState {
    pub players: HashMap<String, PlayerState>,
    pub dragon_alive: bool,
    pub weather: Weather,
    pub mobs: Vec<Mob>,
    pub tension: f64,
    pub global_chaos: f64,
    pub fracture: f64,
    pub phase: Phase,
    pub apocalypse_reached: bool,
    pub victory: bool,
    pub elapsed: Duration,
    pub mobs_spawned: u32,
    pub tnt_spawned: u32,
    pub hostile_effects_applied: u32,
}

impl WorldState {
    pub fn from_players(players: impl IntoIterator<Item = PlayerState>) -> Self {
        Self {
            players: players.into_iter().map(|p| (p.id.clone(), p)).collect(),
            dragon_alive: true,
            weather: Weather::Clear,
            mobs: Vec::new(),
            tension: 0.0,
            global_chaos: 0.0,
            fracture: 0.0,
            phase: Phase::Normal,
            apocalypse_reached: false,
            victory: false,
            elapsed: Duration::ZERO,
            mobs_spawned: 0,
            tnt_spawned: 0,
            hostile_effects_applied: 0,
        }
    }

    pub fn total_fear(&self) -> f64 {
        self.players.values().map(|p| p.fear as f64).sum()
    }

    /// Recomputes `fracture` and `phase` from current tension, fear, and
    /// chaos. `phase` never regresses out of `Apocalypse` once reached.
    pub fn recompute_fracture(&mut self, config: &DirectorConfig) -> bool {
        let previous = self.phase;
        self.fracture = self.tension + self.total_fear() + self.global_chaos;
        if self.fracture >= config.phase_thresholds.apocalypse {
            self.apocalypse_reached = true;
        }
        self.phase = phase_for(self.fracture, &config.phase_thresholds, self.apocalypse_reached);
        self.phase != previous
    }

    pub fn to_snapshot(&self) -> WorldState {
        self.clone()
    }
}
