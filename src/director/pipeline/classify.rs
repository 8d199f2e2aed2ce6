//! CLASSIFY: the first pipeline node. Priority was already assigned at
//! enqueue time (see `event::classify_priority`); this node only decides
//! which branch the event takes next.

use crate::director::event::{Event, EventKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    FastResponse,
    Enrich,
}

pub fn route(event: &Event) -> Route {
    match event.kind() {
        EventKind::Chat => Route::FastResponse,
        _ => Route::Enrich,
    }
}

/// Parses an inbound message into a typed payload. Unknown kinds are logged
/// and discarded at the boundary rather than entering the queue at all.
pub fn parse_inbound_event(message: &serde_json::Value) -> Option<crate::director::event::EventPayload> {
    match serde_json::from_value(message.clone()) {
        Ok(payload) => Some(payload),
        Err(error) => {
            tracing::warn!(%error, "discarding inbound event of unknown shape");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::director::event::{Event, EventPayload};
    use std::time::Duration;

    #[test]
    fn chat_routes_fast_response() {
        let event = Event { subject: None, payload: EventPayload::Chat { message: "gg".into() }, arrival_time: Duration::ZERO };
        assert_eq!(route(&event), Route::FastResponse);
    }

    #[test]
    fn everything_else_routes_enrich() {
        let event = Event { subject: None, payload: EventPayload::DragonKill, arrival_time: Duration::ZERO };
        assert_eq!(route(&event), Route::Enrich);
    }
}
