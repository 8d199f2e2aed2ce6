//! Inbound event model and the debounced priority queue.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::director::config::DirectorConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Advancement,
    Damage,
    Inventory,
    Dimension,
    Chat,
    Death,
    DragonKill,
    MobKill,
    Structure,
    Health,
}

/// A kind-specific payload, tagged the way the corpus tags its world events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventPayload {
    Advancement { name: String },
    Damage { amount: f32, cause: String },
    Inventory { item: String, delta: i32 },
    Dimension { to: String },
    Chat { message: String },
    Death { cause: String },
    DragonKill,
    MobKill { count: u32, mob_type: String },
    Structure { name: String },
    Health { current: f32, max: f32 },
}

impl EventPayload {
    pub fn kind(&self) -> EventKind {
        match self {
            EventPayload::Advancement { .. } => EventKind::Advancement,
            EventPayload::Damage { .. } => EventKind::Damage,
            EventPayload::Inventory { .. } => EventKind::Inventory,
            EventPayload::Dimension { .. } => EventKind::Dimension,
            EventPayload::Chat { .. } => EventKind::Chat,
            EventPayload::Death { .. } => EventKind::Death,
            EventPayload::DragonKill => EventKind::DragonKill,
            EventPayload::MobKill { .. } => EventKind::MobKill,
            EventPayload::Structure { .. } => EventKind::Structure,
            EventPayload::Health { .. } => EventKind::Health,
        }
    }
}

/// An inbound event, immutable once enqueued. `arrival_time` is the virtual
/// clock offset since the run started, supplied by the bridge (live) or the
/// scenario script (replay) rather than read from the wall clock, so replay
/// stays deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub subject: Option<String>,
    pub payload: EventPayload,
    pub arrival_time: Duration,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }
}

/// Which debounce bucket an event kind belongs to. `Critical` and `Chat` are
/// always eligible; the others are throttled by `DirectorConfig::debounce`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DebounceClass {
    State,
    Damage,
    Milestone,
    Chat,
    Critical,
}

/// Maps an event kind onto its debounce class. `Death` and `DragonKill` are
/// placed in their own always-eligible class so a hardcore death is never
/// swallowed by the state-update debounce window.
pub fn debounce_class(kind: EventKind) -> DebounceClass {
    match kind {
        EventKind::Death | EventKind::DragonKill => DebounceClass::Critical,
        EventKind::Chat => DebounceClass::Chat,
        EventKind::Damage => DebounceClass::Damage,
        EventKind::Advancement | EventKind::Structure => DebounceClass::Milestone,
        EventKind::Health | EventKind::Inventory | EventKind::MobKill => DebounceClass::State,
        EventKind::Dimension => DebounceClass::Milestone,
    }
}

/// Assigns the priority a fresh event is queued at. Called once, at
/// `submit`, by the event processor — this is the "classifier" referenced in
/// the data model.
pub fn classify_priority(payload: &EventPayload, config: &DirectorConfig) -> Priority {
    match payload {
        EventPayload::Death { .. } | EventPayload::DragonKill => Priority::Critical,
        EventPayload::Chat { .. } | EventPayload::Structure { .. } => Priority::High,
        EventPayload::Damage { amount, .. } if *amount >= 6.0 => Priority::High,
        EventPayload::Damage { .. } => Priority::Medium,
        EventPayload::Advancement { .. } | EventPayload::Dimension { .. } => Priority::Medium,
        EventPayload::Health { current, max } if *current <= max * 0.2 => Priority::High,
        EventPayload::Health { .. } | EventPayload::Inventory { .. } => Priority::Medium,
        EventPayload::MobKill { .. } => config.mob_kill_priority,
    }
}

const PRIORITY_LEVELS: usize = 4;

fn priority_index(p: Priority) -> usize {
    match p {
        Priority::Low => 0,
        Priority::Medium => 1,
        Priority::High => 2,
        Priority::Critical => 3,
    }
}

/// Non-blocking, debounced, priority-ordered event queue plus the rolling
/// chat buffer the memory store reads from.
pub struct EventProcessor {
    queues: [VecDeque<Event>; PRIORITY_LEVELS],
    last_popped: HashMap<DebounceClass, Duration>,
    chat_buffer: VecDeque<String>,
    chat_capacity: usize,
    capacity: usize,
    overflow_count: u64,
}

impl EventProcessor {
    pub fn new(config: &DirectorConfig) -> Self {
        Self {
            queues: Default::default(),
            last_popped: HashMap::new(),
            chat_buffer: VecDeque::with_capacity(config.chat_buffer),
            chat_capacity: config.chat_buffer,
            capacity: config.queue_capacity,
            overflow_count: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.queues.iter().map(VecDeque::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn overflow_count(&self) -> u64 {
        self.overflow_count
    }

    pub fn chat_buffer(&self) -> impl Iterator<Item = &String> {
        self.chat_buffer.iter()
    }

    /// Enqueues a freshly classified event, evicting the lowest-priority
    /// oldest entry first if the queue is at capacity.
    pub fn submit(&mut self, payload: EventPayload, subject: Option<String>, arrival_time: Duration, config: &DirectorConfig) {
        if self.len() >= self.capacity {
            self.evict_lowest_oldest();
        }
        let priority = classify_priority(&payload, config);
        if let EventPayload::Chat { message } = &payload {
            if self.chat_capacity > 0 {
                if self.chat_buffer.len() >= self.chat_capacity {
                    self.chat_buffer.pop_front();
                }
                self.chat_buffer.push_back(message.clone());
            }
        }
        let event = Event { subject, payload, arrival_time };
        self.queues[priority_index(priority)].push_back(event);
    }

    fn evict_lowest_oldest(&mut self) {
        for queue in self.queues.iter_mut() {
            if let Some(evicted) = queue.pop_front() {
                self.overflow_count += 1;
                warn!(kind = ?evicted.kind(), "queue_overflow: evicted lowest-priority oldest event");
                return;
            }
        }
    }

    fn eligible(&self, class: DebounceClass, arrival_time: Duration, config: &DirectorConfig) -> bool {
        match class {
            DebounceClass::Chat | DebounceClass::Critical => true,
            _ => {
                let interval = match class {
                    DebounceClass::State => config.debounce.state,
                    DebounceClass::Damage => config.debounce.damage,
                    DebounceClass::Milestone => config.debounce.milestone,
                    DebounceClass::Chat | DebounceClass::Critical => Duration::ZERO,
                };
                match self.last_popped.get(&class) {
                    None => true,
                    Some(&last) => arrival_time.saturating_sub(last) > interval,
                }
            }
        }
    }

    /// Returns the highest-priority eligible event, preferring arrival order
    /// within a priority level. Ineligible (debounced) events are left in
    /// place and may become eligible on a later call.
    pub fn next(&mut self, config: &DirectorConfig) -> Option<Event> {
        for level in (0..PRIORITY_LEVELS).rev() {
            let queue = &self.queues[level];
            let position = queue.iter().position(|event| {
                self.eligible(debounce_class(event.kind()), event.arrival_time, config)
            });
            if let Some(position) = position {
                let event = self.queues[level].remove(position).expect("position was just found");
                self.last_popped.insert(debounce_class(event.kind()), event.arrival_time);
                return Some(event);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> DirectorConfig {
        DirectorConfig::default()
    }

    #[test]
    fn priority_beats_arrival_order() {
        let config = cfg();
        let mut processor = EventProcessor::new(&config);
        processor.submit(EventPayload::MobKill { count: 1, mob_type: "zombie".into() }, None, Duration::from_secs(0), &config);
        processor.submit(EventPayload::DragonKill, None, Duration::from_secs(1), &config);
        let first = processor.next(&config).unwrap();
        assert_eq!(first.kind(), EventKind::DragonKill);
    }

    #[test]
    fn debounced_event_is_skipped_until_eligible() {
        let config = cfg();
        let mut processor = EventProcessor::new(&config);
        processor.submit(EventPayload::Health { current: 18.0, max: 20.0 }, None, Duration::from_secs(0), &config);
        let _ = processor.next(&config).unwrap();
        processor.submit(EventPayload::Health { current: 17.0, max: 20.0 }, None, Duration::from_secs(1), &config);
        assert!(processor.next(&config).is_none());
    }

    #[test]
    fn overflow_evicts_lowest_priority_oldest() {
        let mut config = cfg();
        config.queue_capacity = 1;
        let mut processor = EventProcessor::new(&config);
        processor.submit(EventPayload::MobKill { count: 1, mob_type: "zombie".into() }, None, Duration::from_secs(0), &config);
        processor.submit(EventPayload::DragonKill, None, Duration::from_secs(1), &config);
        assert_eq!(processor.overflow_count(), 1);
        assert_eq!(processor.len(), 1);
        assert_eq!(processor.next(&config).unwrap().kind(), EventKind::DragonKill);
    }
}
