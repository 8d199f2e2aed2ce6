//! `WorldDiff`: what a single event or tool call changed in the world,
//! independent of whether the change came from game telemetry or director
//! action. Rejections and warnings are recorded on the diff itself rather
//! than thrown away, so a `RunTrace` stays a complete audit log.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: String,
    pub old: serde_json::Value,
    pub new: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffSource {
    Event,
    ToolCall,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldDiff {
    pub source: DiffSource,
    pub source_name: String,
    pub subject: Option<String>,
    pub changes: Vec<FieldChange>,
    pub caused_death: bool,
    pub caused_victory: bool,
    pub triggered_phase_change: bool,
    pub warning: Option<String>,
    pub rejection_reason: Option<String>,
}

impl WorldDiff {
    pub fn new(source: DiffSource, source_name: impl Into<String>, subject: Option<String>) -> Self {
        Self {
            source,
            source_name: source_name.into(),
            subject,
            changes: Vec::new(),
            caused_death: false,
            caused_victory: false,
            triggered_phase_change: false,
            warning: None,
            rejection_reason: None,
        }
    }

    pub fn push_change(&mut self, field: impl Into<String>, old: serde_json::Value, new: serde_json::Value) {
        self.changes.push(FieldChange { field: field.into(), old, new });
    }

    pub fn rejected(mut self, reason: impl Into<String>) -> Self {
        self.rejection_reason = Some(reason.into());
        self
    }

    pub fn warn(mut self, message: impl Into<String>) -> Self {
        self.warning = Some(message.into());
        self
    }
}
