//! The linear pipeline state machine:
//! `CLASSIFY -> (FAST_RESPONSE | ENRICH) -> MASK -> DECIDE -> (SILENT | ACTION)
//! -> PROTECT -> EXECUTE -> DONE`.
//!
//! Implemented as a single async function matching on an explicit
//! `PipelineState` rather than a dynamic routing table, per the design note
//! that this pipeline should stay a linear state machine.

pub mod agentic_action;
pub mod classify;
pub mod decide;
pub mod enrich;
pub mod execute;
pub mod fast_path;
pub mod mask_select;
pub mod protect;

use std::collections::HashMap;
use std::time::Duration;

use rand::Rng;

use crate::director::bridge::{CorrelationIdGenerator, GameBridge};
use crate::director::config::DirectorConfig;
use crate::director::event::Event;
use crate::director::masks::{MaskRegistry, MaskState, MaskVariant};
use crate::director::memory::{describe_event, LongTermMemory};
use crate::director::model::{Intent, ModelProvider, ModelResponse};
use crate::director::tools::{ToolCall, ToolRegistry};
use crate::director::world::diff::WorldDiff;
use crate::director::world::state::WorldState;
use serde::{Deserialize, Serialize};

use self::protect::RunCounters;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Classify,
    FastResponse,
    Enrich,
    Mask,
    Decide,
    Silent,
    Action,
    Protect,
    Execute,
    Done,
}

/// The decision node's structured output, as named in spec §4.5 / §6.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub intent: Intent,
    pub targets: Vec<String>,
    pub escalation: f32,
    pub rationale: String,
}

pub struct PipelineOutcome {
    pub terminal_state: PipelineState,
    /// The full next mask state (decayed stability, reset-on-switch,
    /// `ticks_since_switch`) — callers must adopt this wholesale rather
    /// than re-deriving it, or the decay machinery never takes effect.
    pub mask_state: MaskState,
    pub decision: DecisionRecord,
    pub narrative: Option<String>,
    pub tool_calls: Vec<ToolCall>,
    pub rejected_calls: Vec<(ToolCall, String)>,
    pub diffs: Vec<WorldDiff>,
    pub world: WorldState,
}

pub struct PipelineDeps<'a> {
    pub registry: &'a ToolRegistry,
    pub masks: &'a MaskRegistry,
    pub long_term: &'a dyn LongTermMemory,
    pub model: &'a dyn ModelProvider,
    pub bridge: &'a dyn GameBridge,
    pub correlation_ids: &'a CorrelationIdGenerator,
}

/// Runs one event through the full pipeline. `mask_state`/`mask_debt` are
/// threaded in and returned updated; nothing here is hidden global state.
#[allow(clippy::too_many_arguments)]
pub async fn run_pipeline(
    event: Event,
    world: &WorldState,
    mask_state: &MaskState,
    mask_debt: &mut HashMap<MaskVariant, f32>,
    recent_events: &[String],
    chat_buffer: &[String],
    run_counters: &mut RunCounters,
    config: &DirectorConfig,
    deps: &PipelineDeps<'_>,
    rng: &mut impl Rng,
) -> PipelineOutcome {
    let arrival = event.arrival_time;
    let route = classify::route(&event);

    if route == classify::Route::FastResponse {
        let next_mask = mask_select::pick_mask(mask_state, &event, deps.masks, mask_debt, &config.mask, rng);
        let response = fast_path::fast_respond(&event, next_mask.current, deps.masks, deps.model, config.chat_timeout).await;
        return finish(response, next_mask, arrival, world.clone(), run_counters, config, deps, true).await;
    }

    let enriched = enrich::enrich(event, recent_events, chat_buffer, deps.long_term, config).await;
    let next_mask = mask_select::pick_mask(mask_state, &enriched.event, deps.masks, mask_debt, &config.mask, rng);
    let description = describe_event(&enriched.event);
    let response = decide::decide(&description, next_mask.current, deps.masks, &enriched.synopsis, deps.model, config.model_timeout).await;

    finish(response, next_mask, arrival, world.clone(), run_counters, config, deps, false).await
}

async fn finish(
    response: ModelResponse,
    mask: MaskState,
    arrival: Duration,
    world: WorldState,
    run_counters: &mut RunCounters,
    config: &DirectorConfig,
    deps: &PipelineDeps<'_>,
    fast_path_only: bool,
) -> PipelineOutcome {
    let decision = DecisionRecord {
        intent: response.intent,
        targets: response.targets.clone(),
        escalation: response.escalation,
        rationale: response.rationale.clone(),
    };

    if response.intent == Intent::Silent {
        return PipelineOutcome {
            terminal_state: PipelineState::Silent,
            mask_state: mask,
            decision,
            narrative: None,
            tool_calls: Vec::new(),
            rejected_calls: Vec::new(),
            diffs: Vec::new(),
            world,
        };
    }

    let origin = if fast_path_only { "fast_path" } else { "decide" };
    let calls = agentic_action::validate_plan(&response.plan, deps.registry, deps.correlation_ids, arrival, origin, fast_path_only);
    let protection = protect::protect(calls, &world, config, run_counters);
    let (next_world, diffs) = execute::execute(&protection.accepted, &world, deps.bridge, config).await;

    PipelineOutcome {
        terminal_state: PipelineState::Done,
        mask_state: mask,
        decision,
        narrative: response.narrative,
        tool_calls: protection.accepted,
        rejected_calls: protection.rejected,
        diffs,
        world: next_world,
    }
}
