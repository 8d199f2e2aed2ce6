//! Short-term synopsis building and the long-term lookup boundary.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::director::error::DirectorError;
use crate::director::event::Event;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemorySynopsis {
    pub recent_events: Vec<String>,
    pub chat_excerpt: Vec<String>,
    pub token_estimate: usize,
}

/// Builds a bounded synopsis from recent events and the chat buffer,
/// trimming from the oldest end until the whitespace-word-count estimate
/// fits the configured token budget. The real tokenizer lives with the
/// model provider; this heuristic only needs to be a reasonable proxy.
pub fn build_synopsis(recent_events: &[String], chat_buffer: &[String], token_budget: usize) -> MemorySynopsis {
    let mut recent_events = recent_events.to_vec();
    let mut chat_excerpt = chat_buffer.to_vec();
    let word_count = |lines: &[String]| -> usize { lines.iter().map(|l| l.split_whitespace().count()).sum() };

    while word_count(&recent_events) + word_count(&chat_excerpt) > token_budget {
        if !recent_events.is_empty() {
            recent_events.remove(0);
        } else if !chat_excerpt.is_empty() {
            chat_excerpt.remove(0);
        } else {
            break;
        }
    }
    let token_estimate = word_count(&recent_events) + word_count(&chat_excerpt);
    MemorySynopsis { recent_events, chat_excerpt, token_estimate }
}

pub fn describe_event(event: &Event) -> String {
    match &event.payload {
        crate::director::event::EventPayload::Advancement { name } => format!("advancement: {name}"),
        crate::director::event::EventPayload::Damage { amount, cause } => format!("damage: {amount} ({cause})"),
        crate::director::event::EventPayload::Inventory { item, delta } => format!("inventory: {item} x{delta}"),
        crate::director::event::EventPayload::Dimension { to } => format!("dimension change: {to}"),
        crate::director::event::EventPayload::Chat { message } => format!("chat: {message}"),
        crate::director::event::EventPayload::Death { cause } => format!("death: {cause}"),
        crate::director::event::EventPayload::DragonKill => "dragon kill".to_string(),
        crate::director::event::EventPayload::MobKill { count, mob_type } => format!("mob kill: {count}x {mob_type}"),
        crate::director::event::EventPayload::Structure { name } => format!("structure: {name}"),
        crate::director::event::EventPayload::Health { current, max } => format!("health: {current}/{max}"),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub aura: i64,
    pub deaths: u32,
    pub dragons_killed: u32,
    pub hours_played: f64,
    pub nemesis_cause: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: String,
    pub victory: bool,
    pub duration_secs: f64,
}

/// The external relational player-statistics store is out of scope; this
/// trait is the seam a live deployment backs with it.
#[async_trait]
pub trait LongTermMemory: Send + Sync {
    async fn player_summary(&self, player: &str) -> Result<PlayerSummary, DirectorError>;
    async fn recent_runs(&self, player: &str, k: usize) -> Result<Vec<RunSummary>, DirectorError>;
}

/// In-memory stand-in used by the scenario runner and tests.
#[derive(Default)]
pub struct FakeLongTermMemory {
    players: Mutex<HashMap<String, PlayerSummary>>,
    runs: Mutex<HashMap<String, Vec<RunSummary>>>,
}

impl FakeLongTermMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_player(&self, player: &str, summary: PlayerSummary) {
        self.players.lock().unwrap().insert(player.to_string(), summary);
    }

    pub fn seed_run(&self, player: &str, run: RunSummary) {
        self.runs.lock().unwrap().entry(player.to_string()).or_default().push(run);
    }
}

#[async_trait]
impl LongTermMemory for FakeLongTermMemory {
    async fn player_summary(&self, player: &str) -> Result<PlayerSummary, DirectorError> {
        self.players
            .lock()
            .unwrap()
            .get(player)
            .cloned()
            .ok_or_else(|| DirectorError::TransientUnavailable(format!("no summary for {player}")))
    }

    async fn recent_runs(&self, player: &str, k: usize) -> Result<Vec<RunSummary>, DirectorError> {
        let runs = self.runs.lock().unwrap();
        let mut list = runs.get(player).cloned().unwrap_or_default();
        list.truncate(k);
        Ok(list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synopsis_trims_oldest_first_to_fit_budget() {
        let events: Vec<String> = (0..20).map(|i| format!("event number {i} happened here")).collect();
        let synopsis = build_synopsis(&events, &[], 10);
        assert!(synopsis.token_estimate <= 10);
        assert!(synopsis.recent_events.last().unwrap().contains("19"));
    }

    #[tokio::test]
    async fn fake_store_returns_unavailable_when_unseeded() {
        let store = FakeLongTermMemory::new();
        let err = store.player_summary("nobody").await.unwrap_err();
        assert!(matches!(err, DirectorError::TransientUnavailable(_)));
    }
}
