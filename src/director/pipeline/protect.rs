//! PROTECT: the last safety gate before dispatch. Rejections are recorded
//! per call, never as an all-or-nothing plan failure.

use crate::director::config::DirectorConfig;
use crate::director::tools::{ToolCall, ToolName};
use crate::director::world::state::WorldState;

#[derive(Debug, Default, Clone, Copy)]
pub struct RunCounters {
    pub mobs_spawned: u32,
    pub tnt_spawned: u32,
    pub hostile_effects_applied: u32,
}

pub struct ProtectionOutcome {
    pub accepted: Vec<ToolCall>,
    pub rejected: Vec<(ToolCall, String)>,
}

fn is_hostile_effect(tool: ToolName) -> bool {
    matches!(tool, ToolName::ApplyEffect | ToolName::SpawnFallingBlock | ToolName::StrikeLightning)
}

pub fn protect(calls: Vec<ToolCall>, state: &WorldState, config: &DirectorConfig, counters: &mut RunCounters) -> ProtectionOutcome {
    let mut accepted = Vec::new();
    let mut rejected = Vec::new();

    for call in calls {
        let target = call.arguments.get("target").and_then(|v| v.as_str());

        if let Some(target) = target {
            match state.players.get(target) {
                Some(player) if !player.alive && !matches!(call.tool, ToolName::RespawnOverride) => {
                    rejected.push((call, "target is not alive".to_string()));
                    continue;
                }
                None => {
                    rejected.push((call, "target is not a known player".to_string()));
                    continue;
                }
                _ => {}
            }
        }

        if matches!(call.tool, ToolName::ProtectPlayer | ToolName::RescueTeleport) {
            if let Some(player) = target.and_then(|t| state.players.get(t)) {
                if player.health >= player.max_health {
                    rejected.push((call, "target is already at full health".to_string()));
                    continue;
                }
            }
        }

        if call.tool == ToolName::DamagePlayer {
            let amount = call.arguments.get("amount").and_then(|v| v.as_f64()).unwrap_or(0.0) as f32;
            if let Some(player) = target.and_then(|t| state.players.get(t)) {
                if player.health - amount < config.health_floor {
                    rejected.push((call, "would push target below the health floor".to_string()));
                    continue;
                }
            }
        }

        if call.tool == ToolName::SpawnMob {
            if counters.mobs_spawned >= config.max_mobs_per_run {
                rejected.push((call, "per-run mob cap reached".to_string()));
                continue;
            }
            counters.mobs_spawned += 1;
        }

        if call.tool == ToolName::SpawnTnt {
            if counters.tnt_spawned >= config.max_tnt_per_run {
                rejected.push((call, "per-run tnt cap reached".to_string()));
                continue;
            }
            counters.tnt_spawned += 1;
        }

        if is_hostile_effect(call.tool) {
            if counters.hostile_effects_applied >= config.max_hostile_effects_per_run {
                rejected.push((call, "per-run hostile effect cap reached".to_string()));
                continue;
            }
            counters.hostile_effects_applied += 1;
        }

        accepted.push(call);
    }

    ProtectionOutcome { accepted, rejected }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::director::world::state::PlayerState;
    use serde_json::json;

    fn call(tool: ToolName, args: serde_json::Value) -> ToolCall {
        ToolCall { tool, arguments: args, correlation_id: "c-1".into(), issued_at: std::time::Duration::ZERO, origin: "test".into() }
    }

    #[test]
    fn damage_below_health_floor_is_rejected() {
        let config = DirectorConfig::default();
        let mut counters = RunCounters::default();
        let mut player = PlayerState::new("steve", "survivor");
        player.health = 1.0;
        let state = WorldState::from_players([player]);
        let calls = vec![call(ToolName::DamagePlayer, json!({"target": "steve", "amount": 5.0}))];
        let outcome = protect(calls, &state, &config, &mut counters);
        assert!(outcome.accepted.is_empty());
        assert_eq!(outcome.rejected.len(), 1);
    }

    #[test]
    fn protect_player_at_full_health_is_rejected() {
        let config = DirectorConfig::default();
        let mut counters = RunCounters::default();
        let state = WorldState::from_players([PlayerState::new("steve", "survivor")]);
        let calls = vec![call(ToolName::ProtectPlayer, json!({"target": "steve", "duration_secs": 5.0}))];
        let outcome = protect(calls, &state, &config, &mut counters);
        assert!(outcome.accepted.is_empty());
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.rejected[0].1, "target is already at full health");
    }

    #[test]
    fn mob_cap_is_enforced() {
        let mut config = DirectorConfig::default();
        config.max_mobs_per_run = 1;
        let mut counters = RunCounters { mobs_spawned: 1, ..Default::default() };
        let state = WorldState::from_players([PlayerState::new("steve", "survivor")]);
        let calls = vec![call(ToolName::SpawnMob, json!({"mob_type": "zombie", "target": "steve"}))];
        let outcome = protect(calls, &state, &config, &mut counters);
        assert!(outcome.accepted.is_empty());
    }
}
