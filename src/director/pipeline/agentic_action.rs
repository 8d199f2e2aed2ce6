//! AGENTIC_ACTION: turns the model's proposed plan into validated
//! `ToolCall`s. Every proposed call is checked against the registry
//! independently; a malformed call is dropped without discarding the rest
//! of the plan.

use crate::director::bridge::CorrelationIdGenerator;
use crate::director::model::ProposedToolCall;
use crate::director::tools::{ToolCall, ToolName, ToolRegistry};
use std::time::Duration;

fn parse_tool_name(raw: &str) -> Option<ToolName> {
    use ToolName::*;
    let candidates = [
        SpawnMob, GiveItem, DamagePlayer, HealPlayer, TeleportPlayer, ApplyEffect, ModifyAura, ChangeWeather,
        SpawnTnt, SpawnFallingBlock, ProtectPlayer, RescueTeleport, RespawnOverride, Broadcast, MessagePlayer,
        StrikeLightning, LaunchFirework, PlaySound, ShowTitle, SpawnParticles, FakeDeath,
    ];
    candidates.into_iter().find(|t| t.as_str() == raw)
}

pub fn validate_plan(
    plan: &[ProposedToolCall],
    registry: &ToolRegistry,
    correlation_ids: &CorrelationIdGenerator,
    issued_at: Duration,
    origin: &str,
    fast_path_only: bool,
) -> Vec<ToolCall> {
    let mut calls = Vec::new();
    for proposed in plan {
        let Some(name) = parse_tool_name(&proposed.tool) else {
            tracing::warn!(tool = %proposed.tool, "agentic action: dropping call to unknown tool");
            continue;
        };
        if fast_path_only {
            match registry.get(name) {
                Some(spec) if spec.chat_fast_path_allowed => {}
                _ => {
                    tracing::warn!(tool = %proposed.tool, "agentic action: tool not allowed on fast path");
                    continue;
                }
            }
        }
        if let Err(error) = registry.validate_args(name, &proposed.arguments) {
            tracing::warn!(%error, tool = %proposed.tool, "agentic action: dropping malformed call");
            continue;
        }
        calls.push(ToolCall {
            tool: name,
            arguments: proposed.arguments.clone(),
            correlation_id: correlation_ids.next(),
            issued_at,
            origin: origin.to_string(),
        });
    }
    calls
}
