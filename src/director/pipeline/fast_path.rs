//! FAST_RESPONSE: the chat shortcut. Bypasses enrichment and the fracture
//! check entirely, runs against a tighter timeout, and is only ever allowed
//! to call `broadcast` or `message_player` — enforced again in `protect`.

use std::time::Duration;

use tokio::time::timeout;

use crate::director::event::Event;
use crate::director::masks::{MaskRegistry, MaskVariant};
use crate::director::memory::describe_event;
use crate::director::model::{ModelProvider, ModelRequest, ModelResponse};

pub async fn fast_respond(event: &Event, mask: MaskVariant, registry: &MaskRegistry, model: &dyn ModelProvider, chat_timeout: Duration) -> ModelResponse {
    let system_prompt = registry.descriptor(mask).system_prompt_fragment.to_string();
    let user_prompt = describe_event(event);
    let request = ModelRequest { system_prompt, user_prompt, temperature: 0.9 };

    match timeout(chat_timeout, model.decide(&request)).await {
        Ok(Ok(response)) => response,
        Ok(Err(_)) | Err(_) => ModelResponse::silent("fast path unavailable"),
    }
}
