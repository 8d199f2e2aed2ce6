//! Pure transitions over `WorldState`: given a prior state and an input
//! (an `Event` or a `ToolCall`), produce a new state plus the `WorldDiff`
//! describing what changed. Never mutates its input.

use serde_json::json;

use crate::director::config::DirectorConfig;
use crate::director::event::{Event, EventPayload};
use crate::director::tools::{ToolCall, ToolName};
use crate::director::world::diff::{DiffSource, WorldDiff};
use crate::director::world::state::{Dimension, WorldState};

/// Applies one telemetry event to the world, returning the next state and a
/// diff. Out-of-domain inputs (an event naming a player who isn't part of
/// the run) are clamped to a no-op with a warning on the diff rather than
/// rejected outright — the synthetic world is total on its input domain.
pub fn apply_event(state: &WorldState, event: &Event, config: &DirectorConfig) -> (WorldState, WorldDiff) {
    let mut next = state.clone();
    let mut diff = WorldDiff::new(DiffSource::Event, format!("{:?}", event.kind()), event.subject.clone());

    match &event.payload {
        EventPayload::Damage { amount, cause } => {
            if let Some(player) = event.subject.as_deref().and_then(|id| next.players.get_mut(id)) {
                let before = player.health;
                player.set_health(player.health - amount);
                player.damage_taken += amount;
                player.fear = (player.fear + *amount as f64 as f32 * 0.5).min(100.0);
                diff.push_change("health", json!(before), json!(player.health));
                next.tension += *amount as f64 * 0.5;
                diff.caused_death = before > 0.0 && !player.alive;
            } else {
                diff = diff.warn(format!("damage event for unknown subject, cause={cause}"));
            }
        }
        EventPayload::Death { cause } => {
            if let Some(player) = event.subject.as_deref().and_then(|id| next.players.get_mut(id)) {
                player.set_health(0.0);
                next.tension += 50.0;
                diff.caused_death = true;
                diff.push_change("alive", json!(true), json!(false));
                diff.push_change("cause", json!(null), json!(cause));
            } else {
                diff = diff.warn("death event for unknown subject".to_string());
            }
        }
        EventPayload::DragonKill => {
            next.dragon_alive = false;
            next.victory = true;
            // Explicit monotonicity exception per spec §8: killing the
            // dragon relieves tension even though most events only add it.
            next.tension = (next.tension - 30.0).max(0.0);
            diff.caused_victory = true;
            diff.push_change("dragon_alive", json!(true), json!(false));
        }
        EventPayload::Dimension { to } => {
            if let Some(player) = event.subject.as_deref().and_then(|id| next.players.get_mut(id)) {
                let before = format!("{:?}", player.dimension);
                player.dimension = match to.as_str() {
                    "nether" => Dimension::Nether,
                    "end" => Dimension::End,
                    _ => Dimension::Overworld,
                };
                if matches!(player.dimension, Dimension::Nether | Dimension::End) {
                    next.tension += 5.0;
                }
                diff.push_change("dimension", json!(before), json!(to));
            }
        }
        EventPayload::Advancement { name } => {
            if let Some(player) = event.subject.as_deref().and_then(|id| next.players.get_mut(id)) {
                player.advancements.push(name.clone());
                diff.push_change("advancements", json!(null), json!(name));
            }
        }
        EventPayload::Structure { name } => {
            diff.push_change("structure_discovered", json!(null), json!(name));
        }
        EventPayload::Inventory { item, delta } => {
            if let Some(player) = event.subject.as_deref().and_then(|id| next.players.get_mut(id)) {
                let entry = player.inventory.entry(item.clone()).or_insert(0);
                let before = *entry;
                *entry = (*entry as i64 + *delta as i64).max(0) as u32;
                diff.push_change(format!("inventory.{item}"), json!(before), json!(*entry));
            }
        }
        EventPayload::Health { current, max } => {
            if let Some(player) = event.subject.as_deref().and_then(|id| next.players.get_mut(id)) {
                let before = player.health;
                player.max_health = *max;
                player.set_health(*current);
                diff.push_change("health", json!(before), json!(player.health));
            }
        }
        EventPayload::MobKill { count, mob_type } => {
            if let Some(player) = event.subject.as_deref().and_then(|id| next.players.get_mut(id)) {
                player.mob_kills += count;
                diff.push_change("mob_kills", json!(player.mob_kills - count), json!(player.mob_kills));
            }
            let _ = mob_type;
        }
        EventPayload::Chat { message } => {
            diff.push_change("chat", json!(null), json!(message));
        }
    }

    diff.triggered_phase_change = next.recompute_fracture(config);
    (next, diff)
}

/// Applies a director-issued tool call to the world. Tool effects are
/// deliberately simple: this is a simulation harness, not a game-accurate
/// physics model.
pub fn apply_tool_call(state: &WorldState, call: &ToolCall, config: &DirectorConfig) -> (WorldState, WorldDiff) {
    let mut next = state.clone();
    let target = call.arguments.get("target").and_then(|v| v.as_str()).map(str::to_string);
    let mut diff = WorldDiff::new(DiffSource::ToolCall, call.tool.as_str().to_string(), target.clone());

    match call.tool {
        ToolName::DamagePlayer => {
            let amount = call.arguments.get("amount").and_then(|v| v.as_f64()).unwrap_or(0.0) as f32;
            if let Some(player) = target.as_deref().and_then(|id| next.players.get_mut(id)) {
                let before = player.health;
                player.set_health(player.health - amount);
                diff.push_change("health", json!(before), json!(player.health));
                diff.caused_death = before > 0.0 && !player.alive;
            }
        }
        ToolName::HealPlayer => {
            let amount = call.arguments.get("amount").and_then(|v| v.as_f64()).unwrap_or(0.0) as f32;
            if let Some(player) = target.as_deref().and_then(|id| next.players.get_mut(id)) {
                let before = player.health;
                player.set_health(player.health + amount);
                player.fear = (player.fear - amount * 0.3).max(0.0);
                diff.push_change("health", json!(before), json!(player.health));
                next.tension = (next.tension - amount as f64 * 0.3).max(0.0);
            }
        }
        ToolName::SpawnMob => {
            next.mobs_spawned += 1;
            next.mobs.push(crate::director::world::state::Mob {
                id: format!("mob-{}", next.mobs.len()),
                mob_type: call.arguments.get("mob_type").and_then(|v| v.as_str()).unwrap_or("zombie").to_string(),
                target: target.clone(),
                alive: true,
            });
            diff.push_change("mobs_spawned", json!(next.mobs_spawned - 1), json!(next.mobs_spawned));
        }
        ToolName::SpawnTnt => {
            next.tnt_spawned += 1;
            diff.push_change("tnt_spawned", json!(next.tnt_spawned - 1), json!(next.tnt_spawned));
        }
        ToolName::ApplyEffect | ToolName::SpawnFallingBlock | ToolName::StrikeLightning => {
            next.hostile_effects_applied += 1;
            diff.push_change("hostile_effects_applied", json!(next.hostile_effects_applied - 1), json!(next.hostile_effects_applied));
        }
        ToolName::ModifyAura => {
            let delta = call.arguments.get("delta").and_then(|v| v.as_i64()).unwrap_or(0);
            if let Some(player) = target.as_deref().and_then(|id| next.players.get_mut(id)) {
                let before = player.aura;
                player.aura += delta;
                diff.push_change("aura", json!(before), json!(player.aura));
            }
        }
        ToolName::ChangeWeather => {
            let weather = call.arguments.get("weather").and_then(|v| v.as_str()).unwrap_or("clear");
            next.weather = match weather {
                "rain" => crate::director::world::state::Weather::Rain,
                "thunder" => crate::director::world::state::Weather::Thunder,
                _ => crate::director::world::state::Weather::Clear,
            };
        }
        ToolName::ProtectPlayer | ToolName::RescueTeleport | ToolName::RespawnOverride => {
            if let Some(player) = target.as_deref().and_then(|id| next.players.get_mut(id)) {
                if matches!(call.tool, ToolName::RespawnOverride) && !player.alive {
                    player.set_health(player.max_health);
                }
                player.fear = (player.fear - 10.0).max(0.0);
            }
        }
        ToolName::TeleportPlayer
        | ToolName::GiveItem
        | ToolName::Broadcast
        | ToolName::MessagePlayer
        | ToolName::LaunchFirework
        | ToolName::PlaySound
        | ToolName::ShowTitle
        | ToolName::SpawnParticles
        | ToolName::FakeDeath => {
            // Cosmetic / informational: no world-state effect beyond the diff entry itself.
        }
    }

    diff.triggered_phase_change = next.recompute_fracture(config);
    (next, diff)
}
