//! ENRICH: attaches a memory synopsis to the event before masking/decision.

use crate::director::config::DirectorConfig;
use crate::director::event::Event;
use crate::director::memory::{build_synopsis, describe_event, LongTermMemory, MemorySynopsis};

pub struct EnrichedEvent {
    pub event: Event,
    pub synopsis: MemorySynopsis,
}

pub async fn enrich(
    event: Event,
    recent_events: &[String],
    chat_buffer: &[String],
    long_term: &dyn LongTermMemory,
    config: &DirectorConfig,
) -> EnrichedEvent {
    let mut synopsis = build_synopsis(recent_events, chat_buffer, config.context_tokens);
    if let Some(subject) = &event.subject {
        if let Ok(summary) = long_term.player_summary(subject).await {
            synopsis.recent_events.push(format!(
                "{subject} history: {} deaths, {} dragon kills, nemesis={:?}",
                summary.deaths, summary.dragons_killed, summary.nemesis_cause
            ));
        }
    }
    synopsis.recent_events.push(describe_event(&event));
    EnrichedEvent { event, synopsis }
}
