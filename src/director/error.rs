//! Error taxonomy for the director core.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DirectorError {
    #[error("transient unavailable: {0}")]
    TransientUnavailable(String),

    #[error("timeout in node {node}")]
    Timeout { node: &'static str },

    #[error("schema violation: {0}")]
    SchemaViolation(String),

    #[error("safety violation: {0}")]
    SafetyViolation(String),

    #[error("queue overflow")]
    QueueOverflow,

    #[error("invariant breach: {0}")]
    InvariantBreach(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, DirectorError>;
