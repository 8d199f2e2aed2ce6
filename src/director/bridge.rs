//! The outbound seam to the game server's plugin command surface. The
//! transport itself (the plugin, the socket it listens on) is out of scope;
//! this module owns the correlation-id contract and the trait live code
//! dispatches through.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tracing::{info, warn};

use crate::director::error::DirectorError;
use crate::director::tools::{ToolCall, ToolOutcome};

/// Correlation ids are drawn from a monotonically increasing generator so
/// dispatch order is always recoverable from the outbound log, even when
/// calls race on the transport.
#[derive(Default)]
pub struct CorrelationIdGenerator(AtomicU64);

impl CorrelationIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> String {
        let n = self.0.fetch_add(1, Ordering::Relaxed);
        format!("evt-{n:08}")
    }
}

#[async_trait]
pub trait GameBridge: Send + Sync {
    async fn dispatch(&self, call: &ToolCall) -> Result<ToolOutcome, DirectorError>;
}

/// Placeholder for the real plugin transport: logs what would be sent and
/// reports success. A live deployment swaps this for a bridge backed by the
/// actual command channel; the pipeline code never needs to change.
pub struct NullGameBridge;

#[async_trait]
impl GameBridge for NullGameBridge {
    async fn dispatch(&self, call: &ToolCall) -> Result<ToolOutcome, DirectorError> {
        info!(tool = call.tool.as_str(), correlation_id = %call.correlation_id, "dispatch (null bridge)");
        Ok(ToolOutcome::Success)
    }
}

/// A bridge that always fails, for exercising executor error paths without
/// standing up a fake transport.
pub struct FailingGameBridge;

#[async_trait]
impl GameBridge for FailingGameBridge {
    async fn dispatch(&self, call: &ToolCall) -> Result<ToolOutcome, DirectorError> {
        warn!(tool = call.tool.as_str(), "dispatch failed (failing bridge)");
        Ok(ToolOutcome::Failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correlation_ids_are_strictly_increasing() {
        let r#gen = CorrelationIdGenerator::new();
        let a = r#gen.next();
        let b = r#gen.next();
        assert!(a < b);
    }
}
