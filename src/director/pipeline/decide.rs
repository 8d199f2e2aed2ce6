//! DECIDE: the enriched event, current mask, and synopsis are turned into a
//! single model call. On any provider failure or timeout, decision falls
//! back to `silent` — the node guarantees at most one model invocation per
//! event.

use std::time::Duration;

use tokio::time::timeout;

use crate::director::masks::{MaskRegistry, MaskVariant};
use crate::director::memory::MemorySynopsis;
use crate::director::model::{ModelProvider, ModelRequest, ModelResponse};

pub async fn decide(
    event_description: &str,
    mask: MaskVariant,
    registry: &MaskRegistry,
    synopsis: &MemorySynopsis,
    model: &dyn ModelProvider,
    model_timeout: Duration,
) -> ModelResponse {
    let system_prompt = registry.descriptor(mask).system_prompt_fragment.to_string();
    let user_prompt = format!(
        "Event: {event_description}\nRecent events: {:?}\nChat: {:?}",
        synopsis.recent_events, synopsis.chat_excerpt
    );
    let request = ModelRequest { system_prompt, user_prompt, temperature: 0.8 };

    match timeout(model_timeout, model.decide(&request)).await {
        Ok(Ok(response)) => response,
        Ok(Err(error)) => {
            tracing::warn!(%error, "decision node: model call failed, falling back to silent");
            ModelResponse::silent(format!("model error: {error}"))
        }
        Err(_) => {
            tracing::warn!("decision node: model call timed out, falling back to silent");
            ModelResponse::silent("model timeout")
        }
    }
}
