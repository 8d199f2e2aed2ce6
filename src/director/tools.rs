//! The tool registry: every outbound capability the director can invoke,
//! partitioned by category, with its JSON-schema argument shape and cost.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::director::error::DirectorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCategory {
    StateChanging,
    Protective,
    Cosmetic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolName {
    SpawnMob,
    GiveItem,
    DamagePlayer,
    HealPlayer,
    TeleportPlayer,
    ApplyEffect,
    ModifyAura,
    ChangeWeather,
    SpawnTnt,
    SpawnFallingBlock,
    ProtectPlayer,
    RescueTeleport,
    RespawnOverride,
    Broadcast,
    MessagePlayer,
    StrikeLightning,
    LaunchFirework,
    PlaySound,
    ShowTitle,
    SpawnParticles,
    FakeDeath,
}

impl ToolName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::SpawnMob => "spawn_mob",
            ToolName::GiveItem => "give_item",
            ToolName::DamagePlayer => "damage_player",
            ToolName::HealPlayer => "heal_player",
            ToolName::TeleportPlayer => "teleport_player",
            ToolName::ApplyEffect => "apply_effect",
            ToolName::ModifyAura => "modify_aura",
            ToolName::ChangeWeather => "change_weather",
            ToolName::SpawnTnt => "spawn_tnt",
            ToolName::SpawnFallingBlock => "spawn_falling_block",
            ToolName::ProtectPlayer => "protect_player",
            ToolName::RescueTeleport => "rescue_teleport",
            ToolName::RespawnOverride => "respawn_override",
            ToolName::Broadcast => "broadcast",
            ToolName::MessagePlayer => "message_player",
            ToolName::StrikeLightning => "strike_lightning",
            ToolName::LaunchFirework => "launch_firework",
            ToolName::PlaySound => "play_sound",
            ToolName::ShowTitle => "show_title",
            ToolName::SpawnParticles => "spawn_particles",
            ToolName::FakeDeath => "fake_death",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: ToolName,
    pub category: ToolCategory,
    pub schema: serde_json::Value,
    pub fracture_cost: f64,
    pub aura_cost: i64,
    pub chat_fast_path_allowed: bool,
}

pub struct ToolRegistry {
    specs: HashMap<ToolName, ToolSpec>,
}

fn spec(name: ToolName, category: ToolCategory, fracture_cost: f64, aura_cost: i64, fast_path: bool, schema: serde_json::Value) -> ToolSpec {
    ToolSpec { name, category, schema, fracture_cost, aura_cost, chat_fast_path_allowed: fast_path }
}

impl ToolRegistry {
    pub fn with_defaults() -> Self {
        use ToolCategory::*;
        use ToolName::*;
        let specs = [
            spec(SpawnMob, StateChanging, 8.0, -10, false, json!({"type": "object", "required": ["mob_type", "target"], "properties": {"mob_type": {"type": "string"}, "target": {"type": "string"}, "count": {"type": "integer"}}})),
            spec(GiveItem, StateChanging, 1.0, -2, false, json!({"type": "object", "required": ["item", "target"], "properties": {"item": {"type": "string"}, "target": {"type": "string"}, "quantity": {"type": "integer"}}})),
            spec(DamagePlayer, StateChanging, 6.0, -5, false, json!({"type": "object", "required": ["target", "amount"], "properties": {"target": {"type": "string"}, "amount": {"type": "number"}, "cause": {"type": "string"}}})),
            spec(HealPlayer, Protective, -4.0, 5, false, json!({"type": "object", "required": ["target", "amount"], "properties": {"target": {"type": "string"}, "amount": {"type": "number"}}})),
            spec(TeleportPlayer, StateChanging, 2.0, -3, false, json!({"type": "object", "required": ["target", "x", "y", "z"], "properties": {"target": {"type": "string"}, "x": {"type": "number"}, "y": {"type": "number"}, "z": {"type": "number"}}})),
            spec(ApplyEffect, StateChanging, 3.0, -4, false, json!({"type": "object", "required": ["target", "effect"], "properties": {"target": {"type": "string"}, "effect": {"type": "string"}, "duration_secs": {"type": "number"}}})),
            spec(ModifyAura, Cosmetic, 0.0, 0, true, json!({"type": "object", "required": ["target", "delta"], "properties": {"target": {"type": "string"}, "delta": {"type": "integer"}}})),
            spec(ChangeWeather, Cosmetic, 1.0, -1, false, json!({"type": "object", "required": ["weather"], "properties": {"weather": {"type": "string"}}})),
            spec(SpawnTnt, StateChanging, 10.0, -15, false, json!({"type": "object", "required": ["target"], "properties": {"target": {"type": "string"}, "count": {"type": "integer"}}})),
            spec(SpawnFallingBlock, StateChanging, 4.0, -6, false, json!({"type": "object", "required": ["target", "block"], "properties": {"target": {"type": "string"}, "block": {"type": "string"}}})),
            spec(ProtectPlayer, Protective, -6.0, 8, false, json!({"type": "object", "required": ["target", "duration_secs"], "properties": {"target": {"type": "string"}, "duration_secs": {"type": "number"}}})),
            spec(RescueTeleport, Protective, -8.0, 10, false, json!({"type": "object", "required": ["target"], "properties": {"target": {"type": "string"}}})),
            spec(RespawnOverride, Protective, -10.0, 12, false, json!({"type": "object", "required": ["target"], "properties": {"target": {"type": "string"}}})),
            spec(Broadcast, Cosmetic, 0.0, 0, true, json!({"type": "object", "required": ["message"], "properties": {"message": {"type": "string"}}})),
            spec(MessagePlayer, Cosmetic, 0.0, 0, true, json!({"type": "object", "required": ["target", "message"], "properties": {"target": {"type": "string"}, "message": {"type": "string"}}})),
            spec(StrikeLightning, Cosmetic, 2.0, -2, false, json!({"type": "object", "required": ["x", "y", "z"], "properties": {"x": {"type": "number"}, "y": {"type": "number"}, "z": {"type": "number"}}})),
            spec(LaunchFirework, Cosmetic, 0.0, 0, true, json!({"type": "object", "required": ["x", "y", "z"], "properties": {"x": {"type": "number"}, "y": {"type": "number"}, "z": {"type": "number"}}})),
            spec(PlaySound, Cosmetic, 0.0, 0, true, json!({"type": "object", "required": ["sound"], "properties": {"sound": {"type": "string"}, "target": {"type": "string"}}})),
            spec(ShowTitle, Cosmetic, 0.0, 0, true, json!({"type": "object", "required": ["target", "title"], "properties": {"target": {"type": "string"}, "title": {"type": "string"}, "subtitle": {"type": "string"}}})),
            spec(SpawnParticles, Cosmetic, 0.0, 0, true, json!({"type": "object", "required": ["x", "y", "z", "effect"], "properties": {"x": {"type": "number"}, "y": {"type": "number"}, "z": {"type": "number"}, "effect": {"type": "string"}}})),
            spec(FakeDeath, Cosmetic, 1.0, -3, false, json!({"type": "object", "required": ["target"], "properties": {"target": {"type": "string"}}})),
        ];
        Self { specs: specs.into_iter().map(|s| (s.name, s)).collect() }
    }

    pub fn get(&self, name: ToolName) -> Option<&ToolSpec> {
        self.specs.get(&name)
    }

    pub fn all(&self) -> impl Iterator<Item = &ToolSpec> {
        self.specs.values()
    }

    pub fn fast_path_tools(&self) -> impl Iterator<Item = &ToolSpec> {
        self.specs.values().filter(|s| s.chat_fast_path_allowed)
    }

    /// Checks the arguments carry every field the schema marks `required`.
    /// Full JSON-schema validation is out of scope — this matches the
    /// "dropped individually, non-conforming calls" contract without
    /// pulling in a schema-validator dependency the rest of the corpus
    /// doesn't use.
    pub fn validate_args(&self, name: ToolName, args: &serde_json::Value) -> Result<(), DirectorError> {
        let spec = self.get(name).ok_or_else(|| DirectorError::SchemaViolation(format!("unknown tool {name:?}")))?;
        let required = spec.schema.get("required").and_then(|r| r.as_array()).cloned().unwrap_or_default();
        for field in required {
            let field = field.as_str().unwrap_or_default();
            if args.get(field).is_none() {
                return Err(DirectorError::SchemaViolation(format!("{} missing required field {field}", name.as_str())));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub tool: ToolName,
    pub arguments: serde_json::Value,
    pub correlation_id: String,
    #[serde(with = "crate::director::config::duration_secs")]
    pub issued_at: Duration,
    pub origin: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolOutcome {
    Success,
    Failure,
    Timeout,
    Rejected,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_has_all_twenty_one_tools() {
        let registry = ToolRegistry::with_defaults();
        assert_eq!(registry.all().count(), 21);
    }

    #[test]
    fn fast_path_tools_are_cosmetic_or_message() {
        let registry = ToolRegistry::with_defaults();
        for spec in registry.fast_path_tools() {
            assert_ne!(spec.category, ToolCategory::StateChanging);
        }
    }

    #[test]
    fn validate_args_rejects_missing_required_field() {
        let registry = ToolRegistry::with_defaults();
        let err = registry.validate_args(ToolName::DamagePlayer, &json!({"target": "steve"})).unwrap_err();
        assert!(matches!(err, DirectorError::SchemaViolation(_)));
    }
}
