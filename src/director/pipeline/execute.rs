//! EXECUTE: dispatches accepted tool calls through the game bridge in
//! order, applying each to the world as it is confirmed, and records the
//! outcome on the resulting diff.

use crate::director::bridge::GameBridge;
use crate::director::config::DirectorConfig;
use crate::director::tools::{ToolCall, ToolOutcome};
use crate::director::world::apply::apply_tool_call;
use crate::director::world::diff::WorldDiff;
use crate::director::world::state::WorldState;

pub async fn execute(calls: &[ToolCall], state: &WorldState, bridge: &dyn GameBridge, config: &DirectorConfig) -> (WorldState, Vec<WorldDiff>) {
    let mut current = state.clone();
    let mut diffs = Vec::with_capacity(calls.len());

    for call in calls {
        let outcome = bridge.dispatch(call).await.unwrap_or(ToolOutcome::Failure);
        match outcome {
            ToolOutcome::Success => {
                let (next, diff) = apply_tool_call(&current, call, config);
                current = next;
                diffs.push(diff);
            }
            ToolOutcome::Failure | ToolOutcome::Timeout | ToolOutcome::Rejected => {
                let mut diff = WorldDiff::new(crate::director::world::diff::DiffSource::ToolCall, call.tool.as_str().to_string(), None);
                diff = diff.warn(format!("dispatch outcome: {outcome:?}"));
                diffs.push(diff);
            }
        }
    }

    (current, diffs)
}
